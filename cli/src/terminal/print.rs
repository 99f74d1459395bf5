use colored::*;
use keyscout_common::model::record::KeyRecord;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str) {
    let formatted = format!("⟦ {} ⟧", msg);
    let msg_len = UnicodeWidthStr::width(formatted.as_str());

    let dash_count = TOTAL_WIDTH.saturating_sub(msg_len);
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

pub fn records(records: &[KeyRecord]) {
    if records.is_empty() {
        no_results();
        return;
    }

    for (idx, record) in records.iter().enumerate() {
        print_record_tree(record, idx);
        if idx + 1 != records.len() {
            println!();
        }
    }

    summary(records.len());
}

fn print_record_tree(record: &KeyRecord, idx: usize) {
    tree_head(idx, &record.host, &record.source);

    let mut details: Vec<(&str, String)> = vec![
        ("Product", record.product_name.clone()),
        ("ProductId", record.product_id.clone()),
        ("Key", record.product_key.clone()),
        ("Status", record.license_status.clone()),
        ("OS", record.os_description.clone()),
        ("Version", record.os_version.clone()),
        ("Vendor", record.manufacturer.clone()),
        ("Model", record.model.clone()),
        ("Serial", record.serial_number.clone()),
    ];
    details.retain(|(_, value)| !value.is_empty());

    as_tree_one_level(&details);
}

fn tree_head(idx: usize, host: &str, source: &str) {
    let idx_str = format!("[{}]", idx.to_string().color(colors::ACCENT));
    println!(
        "{} {} {}",
        idx_str.color(colors::SEPARATOR),
        host.color(colors::PRIMARY),
        format!("({source})").color(colors::SEPARATOR)
    );
}

fn as_tree_one_level(details: &[(&str, String)]) {
    let key_width = details
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or(0);

    for (i, (key, value)) in details.iter().enumerate() {
        let last = i + 1 == details.len();
        let branch = if last {
            "└─".bright_black()
        } else {
            "├─".bright_black()
        };
        println!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(key_width.saturating_sub(key.len()) + 1)
                .color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value.color(colors::TEXT_DEFAULT)
        );
    }
}

fn summary(count: usize) {
    let unit = if count == 1 { "record" } else { "records" };
    let line = format!("{} {unit} recovered", count.to_string().bold().green());
    println!("{}", "═".repeat(TOTAL_WIDTH).bright_black());
    let pad = TOTAL_WIDTH.saturating_sub(console::measure_text_width(&line)) / 2;
    println!("{}{}", " ".repeat(pad), line);
}

pub fn no_results() {
    println!("{}", "no product keys recovered".red().bold());
}

pub fn end_of_program() {
    println!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR));
}
