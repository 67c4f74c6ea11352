use chrono::{FixedOffset, TimeZone, Timelike};
use kopcup::{CopyError, TimeFormat};

fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

#[test]
fn registry_is_closed_and_patterns_are_unique() {
    let all = TimeFormat::all();
    assert_eq!(all.len(), 14);
    for format in all {
        assert_eq!(TimeFormat::from_pattern(format.pattern()).unwrap(), *format);
        assert_eq!(TimeFormat::from_name(format.name()), Some(*format));
    }
    let mut patterns: Vec<_> = all.iter().map(|f| f.pattern()).collect();
    patterns.sort_unstable();
    patterns.dedup();
    assert_eq!(patterns.len(), all.len());
}

#[test]
fn unregistered_pattern_is_rejected() {
    let err = TimeFormat::from_pattern("%d.%m.%Y").unwrap_err();
    assert_eq!(
        err,
        CopyError::NotRegisteredTimeFormat {
            pattern: "%d.%m.%Y".to_string()
        }
    );
    assert!(err.to_string().contains("not registered"));
}

#[test]
fn default_format_is_rfc3339() {
    assert_eq!(TimeFormat::default(), TimeFormat::Rfc3339);
    assert!(TimeFormat::Rfc3339.has_offset());
    assert!(!TimeFormat::DateOnly.has_offset());
}

#[test]
fn rfc3339_parse_and_render_are_symmetric() {
    let text = "2021-11-19T12:30:00+09:00";
    let ts = TimeFormat::Rfc3339.parse(text, jst()).unwrap();
    assert_eq!(ts.timestamp(), 1_637_292_600);
    assert_eq!(TimeFormat::Rfc3339.render(&ts), text);
}

#[test]
fn utc_offsets_render_as_zulu() {
    let utc = FixedOffset::east_opt(0).unwrap();
    let ts = TimeFormat::Rfc3339.parse("2021-11-19T03:30:00Z", jst()).unwrap();
    assert_eq!(ts.offset(), &utc);
    assert_eq!(TimeFormat::Rfc3339.render(&ts), "2021-11-19T03:30:00Z");
}

#[test]
fn nano_variant_keeps_fraction() {
    let ts = TimeFormat::Rfc3339Nano
        .parse("2021-11-19T12:30:00.123456789+09:00", jst())
        .unwrap();
    assert_eq!(ts.nanosecond(), 123_456_789);
    assert_eq!(
        TimeFormat::Rfc3339Nano.render(&ts),
        "2021-11-19T12:30:00.123456789+09:00"
    );
}

#[test]
fn nano_fraction_is_written_in_groups_of_three_digits() {
    let quarter = TimeFormat::Rfc3339Nano
        .parse("2021-11-19T12:30:00.25+09:00", jst())
        .unwrap();
    assert_eq!(
        TimeFormat::Rfc3339Nano.render(&quarter),
        "2021-11-19T12:30:00.250+09:00"
    );
    let whole = jst().with_ymd_and_hms(2021, 11, 19, 12, 30, 0).unwrap();
    assert_eq!(
        TimeFormat::Rfc3339Nano.render(&whole),
        "2021-11-19T12:30:00+09:00"
    );
}

#[test]
fn partial_layouts_fill_in_missing_parts() {
    let date = TimeFormat::DateOnlyBlock.parse("20211119", jst()).unwrap();
    assert_eq!(date, jst().with_ymd_and_hms(2021, 11, 19, 0, 0, 0).unwrap());

    let time = TimeFormat::TimeOnly.parse("12:30:00", jst()).unwrap();
    assert_eq!(time, jst().with_ymd_and_hms(1970, 1, 1, 12, 30, 0).unwrap());
}

#[test]
fn text_that_does_not_fit_pattern_is_a_parse_failure() {
    let err = TimeFormat::DateTimeSlash
        .parse("2021-11-19 12:30:00", jst())
        .unwrap_err();
    assert!(matches!(err, CopyError::ParseFailure { .. }));
}
