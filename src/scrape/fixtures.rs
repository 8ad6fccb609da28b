//! Shared status page fixtures for scrape and monitor tests.
//!
//! Rows mimic the controller's markup: an ordinal cell, the name, three
//! status cells, a `D - code` zone cell, two elapsed-time cells and an
//! icon cell.

/// Builds an occupied sensor row.
///
/// `last_ok` / `last_alarm` are rendered the way the controller does,
/// e.g. `"0d, 0:0:45"` or `"-"`.
pub fn sensor_row(ordinal: usize, name: &str, last_ok: &str, last_alarm: &str) -> String {
    sensor_row_with_icon(ordinal, name, last_ok, last_alarm, "fa-check")
}

/// Builds an occupied sensor row with the alarm bell icon.
pub fn alarming_row(ordinal: usize, name: &str, last_ok: &str) -> String {
    sensor_row_with_icon(ordinal, name, last_ok, "0d, 0:0:1", "fa-bell")
}

/// Builds an occupied sensor row with a specific icon.
pub fn sensor_row_with_icon(
    ordinal: usize,
    name: &str,
    last_ok: &str,
    last_alarm: &str,
    icon: &str,
) -> String {
    format!(
        "<td>{ordinal}.</td><td>{name}</td><td>PIR</td><td>Enabled</td><td>Armed</td>\
         <td>{zone} - z{zone}</td><td>{last_ok}</td><td>{last_alarm}</td>\
         <td><i class=fa {icon}'></i></td>",
        zone = ordinal % 10,
    )
}

/// Builds the row the controller renders for an unoccupied slot.
pub fn placeholder_row(ordinal: usize) -> String {
    format!(
        "<td>{ordinal}.</td><td>-</td><td>-</td><td>-</td><td>-</td>\
         <td>-</td><td>-</td><td>-</td><td></td>"
    )
}

/// Wraps rows into a full status page with a header row.
pub fn page(rows: &[String]) -> String {
    let body: String = rows.iter().map(|r| format!("<tr>{r}</tr>")).collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>OHS</title></head>\n\
         <body onload=\"setTimeout('location.reload()', 5000)\"><table>\
         <tr><th>#</th><th>Name</th><th>Type</th><th>State</th><th>Mode</th>\
         <th>Zone</th><th>OK</th><th>Alarm</th><th></th></tr>{body}</table></body>\n\
         </html>\n"
    )
}

/// A page with one healthy sensor per name.
pub fn healthy_page(names: &[&str]) -> String {
    let rows: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| sensor_row(i + 1, name, "0d, 0:5:00", "-"))
        .collect();
    page(&rows)
}

/// A login page as served when credentials are rejected.
pub const LOGIN_PAGE: &str = "<!DOCTYPE html>\n<html>\n<body>\n\
    <form method=post action=/login><input name=user><input name=pass type=password></form>\n\
    </body>\n</html>\n";
