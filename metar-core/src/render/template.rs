use chrono::Local;

use crate::model::{ReportType, SkyCover, WeatherRecord};
use crate::render::{UNKNOWN_VALUE, celsius_to_fahrenheit, flight_category_label};

/// Output capacity in bytes for a rendered template.
pub const OUTPUT_CAPACITY: usize = 8192;

const UTC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S (UTC)";
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S (local)";

/// Substitute `{placeholder}` tokens from the closed vocabulary in a single
/// left-to-right pass over `format`; replacement text is never rescanned,
/// and anything that is not a recognized placeholder copies through
/// verbatim.
pub fn render_template(record: &WeatherRecord, format: &str, color: bool) -> String {
    render_with_capacity(record, format, color, OUTPUT_CAPACITY)
}

fn render_with_capacity(
    record: &WeatherRecord,
    format: &str,
    color: bool,
    capacity: usize,
) -> String {
    let mut out = String::new();
    let mut rest = format;

    while let Some(open) = rest.find('{') {
        copy_verbatim(&mut out, &rest[..open], capacity);
        rest = &rest[open..];

        let Some(close) = rest.find('}') else {
            break;
        };
        let token = &rest[..=close];
        match token_value(record, token, color) {
            // A replacement only lands when it fits below capacity;
            // otherwise the placeholder itself copies through.
            Some(value) if out.len() + value.len() < capacity => {
                out.push_str(&value);
                rest = &rest[token.len()..];
            }
            Some(_) => {
                tracing::debug!(token, "replacement exceeds output capacity, skipped");
                copy_verbatim(&mut out, token, capacity);
                rest = &rest[token.len()..];
            }
            None => {
                copy_verbatim(&mut out, "{", capacity);
                rest = &rest[1..];
            }
        }
    }
    copy_verbatim(&mut out, rest, capacity);

    out
}

fn copy_verbatim(out: &mut String, text: &str, capacity: usize) {
    for ch in text.chars() {
        if out.len() + ch.len_utf8() < capacity {
            out.push(ch);
        }
    }
}

fn token_value(record: &WeatherRecord, token: &str, color: bool) -> Option<String> {
    let value = match token {
        "{raw_text}" => record.raw_text.clone(),
        "{station_id}" => record.station_id.clone(),
        "{observation_time}" => utc_time(record),
        "{observation_localtime}" => local_time(record),
        "{latitude}" => float2(record.latitude),
        "{longitude}" => float2(record.longitude),
        "{temp_c}" => float1(record.temp_c),
        "{dewpoint_c}" => float1(record.dewpoint_c),
        "{temp_f}" => float1(record.temp_c.map(celsius_to_fahrenheit)),
        "{dewpoint_f}" => float1(record.dewpoint_c.map(celsius_to_fahrenheit)),
        "{wind_dir_degrees}" => integer(record.wind_dir_degrees),
        "{wind_speed_kt}" => integer(record.wind_speed_kt),
        "{wind_gust_kt}" => integer(record.wind_gust_kt),
        "{visibility_statute_mi}" => float1(record.visibility_statute_mi),
        "{altim_in_hg}" => float2(record.altim_in_hg),
        "{sea_level_pressure_mb}" => float2(record.sea_level_pressure_mb),
        "{wx_string}" => record.wx_string.clone(),
        "{three_hr_pressure_tendency_mb}" => float2(record.three_hr_pressure_tendency_mb),
        "{maxT_c}" => float1(record.max_temp_c),
        "{minT_c}" => float1(record.min_temp_c),
        "{maxT24hr_c}" => float1(record.max_temp_24hr_c),
        "{minT24hr_c}" => float1(record.min_temp_24hr_c),
        "{precip_in}" => float1(record.precip_in),
        "{pcp3hr_in}" => float1(record.precip_3hr_in),
        "{pcp6hr_in}" => float1(record.precip_6hr_in),
        "{pcp24hr_in}" => float1(record.precip_24hr_in),
        "{snow_in}" => float1(record.snow_in),
        "{vert_vis_ft}" => integer(record.vert_vis_ft),
        "{elevation_m}" => float1(record.elevation_m),
        "{quality_control_flags}" => record.quality_flags.summary(),
        "{sky_condition}" => sky_summary(record),
        "{metar_type}" => match record.report_type {
            ReportType::Speci => "SPECI".to_string(),
            _ => "METAR".to_string(),
        },
        "{flight_category}" => flight_category_label(record.flight_category, color),
        _ => return None,
    };
    Some(value)
}

// Values round to their display precision before substitution, so "14.96"
// lands as "15.0" rather than truncating.

fn float1(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", (v * 10.0).round() / 10.0))
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

fn float2(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", (v * 100.0).round() / 100.0))
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

fn integer(value: Option<i32>) -> String {
    value
        .filter(|v| *v >= 0)
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

fn utc_time(record: &WeatherRecord) -> String {
    record
        .observation_time
        .map(|time| time.format(UTC_TIME_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

fn local_time(record: &WeatherRecord) -> String {
    record
        .observation_time
        .map(|time| {
            time.with_timezone(&Local)
                .format(LOCAL_TIME_FORMAT)
                .to_string()
        })
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

fn sky_summary(record: &WeatherRecord) -> String {
    record
        .sky_layers
        .iter()
        .map(|layer| match layer.base_ft_agl {
            Some(base) if base >= 0 && layer.cover != SkyCover::Clear => {
                format!("{}{base}", layer.cover.code())
            }
            _ => layer.cover.code().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlightCategory, QualityFlags, SkyLayer};
    use chrono::{TimeZone, Utc};

    #[test]
    fn no_placeholders_renders_unchanged() {
        let record = WeatherRecord::default();
        let format = "winds & skies: nothing to expand here";
        assert_eq!(render_template(&record, format, false), format);
    }

    #[test]
    fn raw_text_alone_renders_exact_raw_text() {
        let record = WeatherRecord {
            raw_text: "KPDX 092053Z 27008KT 10SM FEW048 15/10 A3012".to_string(),
            ..WeatherRecord::default()
        };
        assert_eq!(render_template(&record, "{raw_text}", false), record.raw_text);
    }

    #[test]
    fn unset_numeric_fields_render_unknown() {
        let record = WeatherRecord::default();
        let out = render_template(
            &record,
            "{temp_c}|{temp_f}|{wind_speed_kt}|{latitude}|{altim_in_hg}|{vert_vis_ft}|{elevation_m}|{observation_time}|{observation_localtime}|{snow_in}",
            false,
        );
        assert_eq!(
            out,
            "(unknown)|(unknown)|(unknown)|(unknown)|(unknown)|(unknown)|(unknown)|(unknown)|(unknown)|(unknown)"
        );
    }

    #[test]
    fn negative_integers_render_unknown() {
        let record = WeatherRecord {
            wind_gust_kt: Some(-1),
            ..WeatherRecord::default()
        };
        assert_eq!(render_template(&record, "{wind_gust_kt}", false), "(unknown)");
    }

    #[test]
    fn values_round_to_display_precision() {
        let record = WeatherRecord {
            temp_c: Some(14.96),
            altim_in_hg: Some(30.1234),
            latitude: Some(45.604),
            wind_dir_degrees: Some(270),
            ..WeatherRecord::default()
        };
        let out = render_template(
            &record,
            "{temp_c} {temp_f} {altim_in_hg} {latitude} {wind_dir_degrees}",
            false,
        );
        assert_eq!(out, "15.0 58.9 30.12 45.60 270");
    }

    #[test]
    fn timestamps_render_utc_and_local_markers() {
        let record = WeatherRecord {
            observation_time: Some(Utc.with_ymd_and_hms(2013, 6, 9, 20, 53, 0).unwrap()),
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_template(&record, "{observation_time}", false),
            "2013-06-09 20:53:00 (UTC)"
        );
        assert!(render_template(&record, "{observation_localtime}", false).ends_with("(local)"));
    }

    #[test]
    fn quality_flags_token_uses_canonical_order() {
        let record = WeatherRecord {
            quality_flags: QualityFlags {
                corrected: true,
                auto_station: true,
                no_signal: true,
                weather_sensor_off: true,
                ..QualityFlags::default()
            },
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_template(&record, "{quality_control_flags}", false),
            "COR AUTOST NOSIG INOP"
        );
    }

    #[test]
    fn sky_condition_token_formats_layers() {
        let record = WeatherRecord {
            sky_layers: vec![
                SkyLayer {
                    cover: SkyCover::Few,
                    base_ft_agl: Some(4800),
                },
                SkyLayer {
                    cover: SkyCover::Clear,
                    base_ft_agl: Some(9999),
                },
                SkyLayer {
                    cover: SkyCover::Broken,
                    base_ft_agl: None,
                },
                SkyLayer {
                    cover: SkyCover::Unknown,
                    base_ft_agl: Some(500),
                },
            ],
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_template(&record, "{sky_condition}", false),
            "FEW4800 CLR BKN ???500"
        );
        assert_eq!(
            render_template(&WeatherRecord::default(), "{sky_condition}", false),
            ""
        );
    }

    #[test]
    fn metar_type_token_defaults_to_metar() {
        let speci = WeatherRecord {
            report_type: ReportType::Speci,
            ..WeatherRecord::default()
        };
        assert_eq!(render_template(&speci, "{metar_type}", false), "SPECI");
        assert_eq!(
            render_template(&WeatherRecord::default(), "{metar_type}", false),
            "METAR"
        );
    }

    #[test]
    fn flight_category_token_honors_color() {
        let record = WeatherRecord {
            flight_category: FlightCategory::Vfr,
            ..WeatherRecord::default()
        };
        assert_eq!(render_template(&record, "{flight_category}", false), "VFR");
        assert_eq!(
            render_template(&record, "{flight_category}", true),
            "\x1b[1;32mVFR\x1b[0m"
        );
    }

    #[test]
    fn unrecognized_tokens_copy_through() {
        let record = WeatherRecord {
            temp_c: Some(15.0),
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_template(&record, "{bogus} {temp_c}{", false),
            "{bogus} 15.0{"
        );
        assert_eq!(
            render_template(&record, "{temp{temp_c}_c}", false),
            "{temp15.0_c}"
        );
    }

    #[test]
    fn replacement_text_is_never_rescanned() {
        let record = WeatherRecord {
            raw_text: "{temp_c}".to_string(),
            temp_c: Some(15.0),
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_template(&record, "{raw_text} {temp_c}", false),
            "{temp_c} 15.0"
        );
    }

    #[test]
    fn oversized_replacement_copies_placeholder_verbatim() {
        let record = WeatherRecord {
            raw_text: "X".repeat(50),
            ..WeatherRecord::default()
        };
        assert_eq!(
            render_with_capacity(&record, "{raw_text}!", false, 32),
            "{raw_text}!"
        );
    }

    #[test]
    fn capacity_check_is_strict() {
        let record = WeatherRecord {
            temp_c: Some(15.0),
            ..WeatherRecord::default()
        };
        // "15.0" has 4 bytes: it fits below a capacity of 5, not 4.
        assert_eq!(render_with_capacity(&record, "{temp_c}", false, 5), "15.0");
        assert_eq!(render_with_capacity(&record, "{temp_c}", false, 4), "{te");
    }

    #[test]
    fn default_capacity_applies() {
        let record = WeatherRecord {
            raw_text: "K".repeat(OUTPUT_CAPACITY + 100),
            ..WeatherRecord::default()
        };
        assert_eq!(render_template(&record, "{raw_text}", false), "{raw_text}");
    }
}
