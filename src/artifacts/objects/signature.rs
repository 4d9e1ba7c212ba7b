//! Author, committer and tagger lines
//!
//! Format: `<name> <<email>> <unix-timestamp> <+hhmm>`

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Signature {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Signature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }

    fn parse_offset(timezone: &str) -> Option<chrono::FixedOffset> {
        let (sign, digits) = match timezone.split_at_checked(1)? {
            ("+", digits) => (1, digits),
            ("-", digits) => (-1, digits),
            _ => return None,
        };
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let hours = digits[..2].parse::<i32>().ok()?;
        let minutes = digits[2..].parse::<i32>().ok()?;
        chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl TryFrom<&str> for Signature {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        // split from the right: timezone, timestamp, then "name <email>"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(Error::malformed(format!("bad signature '{value}'")));
        }

        let timezone = parts[0];
        let seconds = parts[1]
            .parse::<i64>()
            .map_err(|_| Error::malformed(format!("bad signature timestamp '{}'", parts[1])))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| Error::malformed("signature without '<'"))?;
        let email_end = name_email
            .rfind('>')
            .filter(|&end| end > email_start)
            .ok_or_else(|| Error::malformed("signature without '>'"))?;

        let offset = Self::parse_offset(timezone)
            .ok_or_else(|| Error::malformed(format!("bad signature timezone '{timezone}'")))?;
        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| Error::malformed(format!("timestamp {seconds} out of range")))?
            .with_timezone(&offset);

        Ok(Signature {
            name: name_email[..email_start].trim().to_string(),
            email: name_email[email_start + 1..email_end].to_string(),
            timestamp,
        })
    }
}
