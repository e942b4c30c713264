//! Sheet rows built from one message and its extracted links.

use crate::mailbox::permalink;
use crate::message::Message;
use crate::store::LinkRow;
use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;
use std::fmt::Display;

/// RFC 2822 `Date` header layout as sent by Gmail.
const HEADER_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `Date` header in local time as `YYYY-MM-DD HH:MM`, or verbatim if it
/// does not parse.
pub fn display_date(raw: &str) -> String {
    display_date_in(raw, &Local)
}

pub fn display_date_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_str(raw.trim(), HEADER_DATE_FORMAT) {
        Ok(parsed) => parsed.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// One row per URL not already in `known`; recorded URLs are added to `known`.
pub fn rows_for_message(
    message_id: &str,
    message: &Message,
    urls: &[String],
    known: &mut HashSet<String>,
) -> Vec<LinkRow> {
    let fresh: Vec<&String> = urls.iter().filter(|url| known.insert((*url).clone())).collect();
    if fresh.is_empty() {
        return Vec::new();
    }

    let date = display_date(message.date());
    let link = permalink(message_id);
    fresh
        .into_iter()
        .map(|url| LinkRow {
            date: date.clone(),
            from: message.sender().to_string(),
            subject: message.subject().to_string(),
            job_url: url.clone(),
            permalink: link.clone(),
            status: String::new(),
            notes: String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Header, Part};
    use chrono::{FixedOffset, Utc};

    fn message(headers: &[(&str, &str)]) -> Message {
        Message {
            id: "m1".into(),
            payload: Some(Part {
                headers: headers
                    .iter()
                    .map(|(name, value)| Header {
                        name: (*name).into(),
                        value: (*value).into(),
                    })
                    .collect(),
                ..Part::default()
            }),
            ..Message::default()
        }
    }

    #[test]
    fn date_is_converted_to_target_zone() {
        assert_eq!(
            display_date_in("Tue, 07 Oct 2025 14:05:09 +0200", &Utc),
            "2025-10-07 12:05"
        );
        let copenhagen = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            display_date_in("Tue, 07 Oct 2025 12:05:09 +0000", &copenhagen),
            "2025-10-07 14:05"
        );
    }

    #[test]
    fn unparseable_date_is_kept_verbatim() {
        let raw = "Tue, 7 Oct 2025 14:05:09 +0200 (CEST)";
        assert_eq!(display_date_in(raw, &Utc), raw);
        assert_eq!(display_date_in("", &Utc), "");
    }

    #[test]
    fn rows_skip_known_urls_and_remember_new_ones() {
        let msg = message(&[
            ("Subject", "3 new jobs"),
            ("From", "LinkedIn <jobs-noreply@linkedin.com>"),
            ("Date", "Not a date"),
        ]);
        let mut known: HashSet<String> = ["https://lnkd.in/old".to_string()].into();
        let urls = vec![
            "https://lnkd.in/new".to_string(),
            "https://lnkd.in/old".to_string(),
        ];

        let rows = rows_for_message("abc", &msg, &urls, &mut known);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.job_url, "https://lnkd.in/new");
        assert_eq!(row.subject, "3 new jobs");
        assert_eq!(row.from, "LinkedIn <jobs-noreply@linkedin.com>");
        assert_eq!(row.date, "Not a date");
        assert_eq!(row.permalink, "https://mail.google.com/mail/u/0/#inbox/abc");
        assert!(row.status.is_empty() && row.notes.is_empty());
        assert!(known.contains("https://lnkd.in/new"));

        assert!(rows_for_message("abc", &msg, &urls, &mut known).is_empty());
    }
}
