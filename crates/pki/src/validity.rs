//! Certificate validity windows.
//!
//! Times are encoded as UTCTime before 2050 and GeneralizedTime from 2050 on,
//! at second precision.

use der::asn1::{GeneralizedTime, UtcTime};
use der::DateTime;
use std::time::{Duration, SystemTime};
use x509_cert::time::{Time, Validity};

use crate::error::{PkiError, PkiResult};

/// Lifetime of the self-signed root, in calendar years.
pub const ROOT_VALIDITY_YEARS: u16 = 10;

/// Shortest leaf lifetime that still yields `notAfter > notBefore`.
pub const MIN_LEAF_VALIDITY: Duration = Duration::from_secs(1);

const UTC_TIME_CUTOFF_YEAR: u16 = 2050;

/// `[now, now + N calendar years)` for the root certificate.
pub(crate) fn root_validity(now: SystemTime) -> PkiResult<Validity> {
    let not_before = DateTime::from_system_time(now)
        .map_err(|e| PkiError::Signing(format!("unrepresentable time: {}", e)))?;
    let not_after = add_years(&not_before, ROOT_VALIDITY_YEARS)?;

    Ok(Validity {
        not_before: asn1_time(not_before)?,
        not_after: asn1_time(not_after)?,
    })
}

/// `[now, now + validity)` for a leaf certificate.
pub(crate) fn leaf_validity(now: SystemTime, validity: Duration) -> PkiResult<Validity> {
    // Both ends are truncated to whole seconds
    if validity < MIN_LEAF_VALIDITY {
        return Err(PkiError::InvalidValidityPeriod(format!(
            "validity period {:?} is shorter than {:?}",
            validity, MIN_LEAF_VALIDITY
        )));
    }

    let end = now.checked_add(validity).ok_or_else(|| {
        PkiError::InvalidValidityPeriod(format!("{:?} overflows the clock", validity))
    })?;

    let not_before = DateTime::from_system_time(now)
        .map_err(|e| PkiError::Signing(format!("unrepresentable time: {}", e)))?;
    let not_after = DateTime::from_system_time(end).map_err(|e| {
        PkiError::InvalidValidityPeriod(format!("{:?} is out of range: {}", validity, e))
    })?;

    Ok(Validity {
        not_before: asn1_time(not_before)?,
        not_after: asn1_time(not_after)?,
    })
}

/// Calendar-year addition. Feb 29 rolls over to Mar 1 in non-leap years.
fn add_years(start: &DateTime, years: u16) -> PkiResult<DateTime> {
    let year = start.year() + years;
    let (month, day) = if start.month() == 2 && start.day() == 29 && !is_leap_year(year) {
        (3, 1)
    } else {
        (start.month(), start.day())
    };

    DateTime::new(
        year,
        month,
        day,
        start.hour(),
        start.minutes(),
        start.seconds(),
    )
    .map_err(|e| PkiError::Signing(format!("unrepresentable time: {}", e)))
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn asn1_time(datetime: DateTime) -> PkiResult<Time> {
    if datetime.year() < UTC_TIME_CUTOFF_YEAR {
        UtcTime::from_date_time(datetime)
            .map(Time::UtcTime)
            .map_err(|e| PkiError::Signing(format!("unrepresentable time: {}", e)))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(datetime)))
    }
}
