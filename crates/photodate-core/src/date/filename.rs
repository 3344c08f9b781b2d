use std::sync::LazyLock;

use regex::Regex;

use super::YearMonth;

// Six leading digits: four-digit year, two-digit month.
static LEADING_YYYYMM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})").unwrap());

/// Extract the year-month token a filename leads with.
///
/// A token outside year 1900-2100 or month 01-12 means the filename
/// carries no usable date; that is `None`, not a failure.
pub fn filename_year_month(name: &str) -> Option<YearMonth> {
    let caps = LEADING_YYYYMM.captures(name)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    YearMonth::new(year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_token_extracted() {
        let ym = filename_year_month("202401_beach.jpg").unwrap();
        assert_eq!(ym.year, 2024);
        assert_eq!(ym.month, 1);
        assert_eq!(ym.to_string(), "202401");
    }

    #[test]
    fn test_december_boundary() {
        assert_eq!(filename_year_month("190012_old.png").unwrap().to_string(), "190012");
        assert_eq!(filename_year_month("210001_far.png").unwrap().to_string(), "210001");
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(filename_year_month("999999_x.jpg").is_none());
        assert!(filename_year_month("202400_x.jpg").is_none());
        assert!(filename_year_month("202413_x.jpg").is_none());
        assert!(filename_year_month("189912_x.jpg").is_none());
        assert!(filename_year_month("210101_x.jpg").is_none());
    }

    #[test]
    fn test_non_digit_prefixes_rejected() {
        assert!(filename_year_month("IMG_1234.jpg").is_none());
        assert!(filename_year_month("20240a_x.jpg").is_none());
        assert!(filename_year_month("photo.jpg").is_none());
        assert!(filename_year_month("2024.jpg").is_none());
        assert!(filename_year_month("").is_none());
    }

    #[test]
    fn test_longer_digit_runs_take_first_six() {
        // "2024011_x" starts with seven digits; the token is the first six.
        assert_eq!(filename_year_month("2024011_x.jpg").unwrap().to_string(), "202401");
    }

    #[test]
    fn test_token_not_required_to_be_delimited() {
        assert_eq!(filename_year_month("202403.jpg").unwrap().to_string(), "202403");
        assert_eq!(filename_year_month("202403trip.jpg").unwrap().to_string(), "202403");
    }
}
