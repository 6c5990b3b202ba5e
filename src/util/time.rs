// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Time-related utility functions.

use chrono::{
    format::{parse, Parsed, StrftimeItems},
    DateTime, Datelike, NaiveDate, Utc,
};
use regex::Regex;
use std::sync::LazyLock;
use std::time::SystemTime;

/// Allowed date formats (as specified in a tag field).
const PARTIAL_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y-%m", "%Y%m%d", "%Y%m", "%Y"];

/// Matches a leading four-digit year, e.g. in `2003-05-12T10:00:00` or `1999 (Remaster)`.
static LEADING_YEAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})").ok());

/// Parse a date from a [`str`] slice by trying various common formats.
fn parse_partial_date_from_str(value: impl AsRef<str>) -> Option<NaiveDate> {
    for fmt in PARTIAL_DATE_FORMATS {
        let mut parsed = Parsed::new();
        if parse(&mut parsed, value.as_ref(), StrftimeItems::new(fmt)).is_err() {
            continue;
        }

        if let Some(date) = parsed
            .year()
            .map(|year| {
                parsed
                    .month
                    .map_or((year, 1, 1), |month| (year, month, parsed.day.unwrap_or(1)))
            })
            .and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
        {
            return Some(date);
        }
    }

    None
}

/// Parse the year from a date string.
///
/// Full and partial dates are supported. If the value is not a date, a leading four-digit number
/// is used.
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    parse_partial_date_from_str(value)
        .map(|date| date.year())
        .or_else(|| {
            LEADING_YEAR
                .as_ref()
                .and_then(|re| re.captures(value))
                .and_then(|captures| captures.get(1))
                .and_then(|year| year.as_str().parse().ok())
        })
}

/// Convert a system time into a unix timestamp (seconds).
pub fn unix_timestamp(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}
