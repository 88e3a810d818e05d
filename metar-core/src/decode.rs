use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{
    FlightCategory, MAX_SKY_LAYERS, QualityFlags, ReportType, SkyCover, SkyLayer, WeatherRecord,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Decoding failures. Only an unparseable document is fatal for a station;
/// a well-formed document with no reports decodes to an empty vector.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid XML data")]
    InvalidDocument(#[from] serde_xml_rs::Error),
}

/// Decode an ADDS XML response into at most `max_records` weather records,
/// in document order.
pub fn decode_document(xml: &str, max_records: usize) -> Result<Vec<WeatherRecord>, DecodeError> {
    let response: AddsResponse = serde_xml_rs::from_str(xml)?;
    let reports = response.data.map(|data| data.reports).unwrap_or_default();

    Ok(reports
        .into_iter()
        .take(max_records)
        .map(WeatherRecord::from)
        .collect())
}

// Wire shape of the ADDS "dataserver" response. Every leaf is an optional
// string; numeric coercion happens in the conversion to WeatherRecord so a
// malformed field can never fail the whole document.

#[derive(Debug, Deserialize)]
struct AddsResponse {
    data: Option<AddsData>,
}

#[derive(Debug, Deserialize)]
struct AddsData {
    #[serde(rename = "METAR", default)]
    reports: Vec<AddsReport>,
}

#[derive(Debug, Deserialize)]
struct AddsReport {
    raw_text: Option<String>,
    station_id: Option<String>,
    observation_time: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    temp_c: Option<String>,
    dewpoint_c: Option<String>,
    wind_dir_degrees: Option<String>,
    wind_speed_kt: Option<String>,
    wind_gust_kt: Option<String>,
    visibility_statute_mi: Option<String>,
    altim_in_hg: Option<String>,
    sea_level_pressure_mb: Option<String>,
    quality_control_flags: Option<AddsQualityFlags>,
    wx_string: Option<String>,
    #[serde(default)]
    sky_condition: Vec<AddsSkyCondition>,
    flight_category: Option<String>,
    three_hr_pressure_tendency_mb: Option<String>,
    #[serde(rename = "maxT_c")]
    max_t_c: Option<String>,
    #[serde(rename = "minT_c")]
    min_t_c: Option<String>,
    #[serde(rename = "maxT24hr_c")]
    max_t_24hr_c: Option<String>,
    #[serde(rename = "minT24hr_c")]
    min_t_24hr_c: Option<String>,
    precip_in: Option<String>,
    pcp3hr_in: Option<String>,
    pcp6hr_in: Option<String>,
    pcp24hr_in: Option<String>,
    snow_in: Option<String>,
    vert_vis_ft: Option<String>,
    metar_type: Option<String>,
    elevation_m: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddsSkyCondition {
    sky_cover: Option<String>,
    cloud_base_ft_agl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddsQualityFlags {
    corrected: Option<String>,
    auto: Option<String>,
    auto_station: Option<String>,
    maintenance_indicator: Option<String>,
    no_signal: Option<String>,
    lightning_sensor_off: Option<String>,
    freezing_rain_sensor_off: Option<String>,
    present_weather_sensor_off: Option<String>,
}

impl From<AddsReport> for WeatherRecord {
    fn from(report: AddsReport) -> Self {
        // Both attributes of a layer are decoded before the layer is
        // recorded, so partial or reordered attribute pairs stay paired.
        let sky_layers: Vec<SkyLayer> = report
            .sky_condition
            .into_iter()
            .take(MAX_SKY_LAYERS)
            .map(|layer| SkyLayer {
                cover: layer
                    .sky_cover
                    .as_deref()
                    .map(SkyCover::from_code)
                    .unwrap_or_default(),
                base_ft_agl: opt_i32(layer.cloud_base_ft_agl),
            })
            .collect();

        WeatherRecord {
            raw_text: report.raw_text.unwrap_or_default(),
            station_id: report
                .station_id
                .map(|id| id.chars().take(4).collect())
                .unwrap_or_default(),
            observation_time: report.observation_time.as_deref().and_then(parse_timestamp),
            latitude: opt_f64(report.latitude),
            longitude: opt_f64(report.longitude),
            temp_c: opt_f64(report.temp_c),
            dewpoint_c: opt_f64(report.dewpoint_c),
            wind_dir_degrees: opt_i32(report.wind_dir_degrees),
            wind_speed_kt: opt_i32(report.wind_speed_kt),
            wind_gust_kt: opt_i32(report.wind_gust_kt),
            visibility_statute_mi: opt_f64(report.visibility_statute_mi),
            altim_in_hg: opt_f64(report.altim_in_hg),
            sea_level_pressure_mb: opt_f64(report.sea_level_pressure_mb),
            quality_flags: report
                .quality_control_flags
                .map(QualityFlags::from)
                .unwrap_or_default(),
            wx_string: report.wx_string.unwrap_or_default(),
            sky_layers,
            flight_category: report
                .flight_category
                .as_deref()
                .map(FlightCategory::from_code)
                .unwrap_or_default(),
            three_hr_pressure_tendency_mb: opt_f64(report.three_hr_pressure_tendency_mb),
            max_temp_c: opt_f64(report.max_t_c),
            min_temp_c: opt_f64(report.min_t_c),
            max_temp_24hr_c: opt_f64(report.max_t_24hr_c),
            min_temp_24hr_c: opt_f64(report.min_t_24hr_c),
            precip_in: opt_f64(report.precip_in),
            precip_3hr_in: opt_f64(report.pcp3hr_in),
            precip_6hr_in: opt_f64(report.pcp6hr_in),
            precip_24hr_in: opt_f64(report.pcp24hr_in),
            snow_in: opt_f64(report.snow_in),
            vert_vis_ft: opt_i32(report.vert_vis_ft),
            report_type: report
                .metar_type
                .as_deref()
                .map(ReportType::from_code)
                .unwrap_or_default(),
            elevation_m: opt_f64(report.elevation_m),
        }
    }
}

impl From<AddsQualityFlags> for QualityFlags {
    fn from(flags: AddsQualityFlags) -> Self {
        QualityFlags {
            corrected: is_true(&flags.corrected),
            auto: is_true(&flags.auto),
            auto_station: is_true(&flags.auto_station),
            maintenance: is_true(&flags.maintenance_indicator),
            no_signal: is_true(&flags.no_signal),
            lightning_sensor_off: is_true(&flags.lightning_sensor_off),
            freezing_rain_sensor_off: is_true(&flags.freezing_rain_sensor_off),
            weather_sensor_off: is_true(&flags.present_weather_sensor_off),
        }
    }
}

fn is_true(field: &Option<String>) -> bool {
    field
        .as_deref()
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn opt_f64(field: Option<String>) -> Option<f64> {
    field.as_deref().map(lenient_f64)
}

/// Integer quantities are all non-negative; -1 is the wire's own marker
/// for "not reported" and decodes to `None` like an absent field.
fn opt_i32(field: Option<String>) -> Option<i32> {
    field
        .as_deref()
        .map(lenient_i32)
        .filter(|value| *value >= 0)
}

/// C-library-style float conversion: the longest leading numeric prefix
/// counts ("10SM" reads as 10.0) and text with no such prefix reads as 0.0.
fn lenient_f64(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut digits = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exponent_digits = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exponent_digits {
            end = cursor;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}

/// Integer counterpart of [`lenient_f64`].
fn lenient_i32(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }

    trimmed[..end].parse().unwrap_or(0)
}
