use chrono::{DateTime, Utc};

/// Upper bound on recorded sky-condition layers per report; layers past
/// this count in the source document are dropped.
pub const MAX_SKY_LAYERS: usize = 4;

/// Sky-cover code reported for a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkyCover {
    SkyClear,
    Clear,
    Cavok,
    Few,
    Scattered,
    Broken,
    Overcast,
    Obscured,
    #[default]
    Unknown,
}

impl SkyCover {
    pub fn from_code(code: &str) -> Self {
        match code {
            "SKC" => SkyCover::SkyClear,
            "CLR" => SkyCover::Clear,
            "CAVOK" => SkyCover::Cavok,
            "FEW" => SkyCover::Few,
            "SCT" => SkyCover::Scattered,
            "BKN" => SkyCover::Broken,
            "OVC" => SkyCover::Overcast,
            "OVX" => SkyCover::Obscured,
            _ => SkyCover::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SkyCover::SkyClear => "SKC",
            SkyCover::Clear => "CLR",
            SkyCover::Cavok => "CAVOK",
            SkyCover::Few => "FEW",
            SkyCover::Scattered => "SCT",
            SkyCover::Broken => "BKN",
            SkyCover::Overcast => "OVC",
            SkyCover::Obscured => "OVX",
            SkyCover::Unknown => "???",
        }
    }

    /// Descriptive phrase used by the decoded layout.
    pub fn label(&self) -> &'static str {
        match self {
            SkyCover::SkyClear => "Sky clear",
            SkyCover::Clear => "Clear",
            SkyCover::Cavok => "Ceiling/visibility okay",
            SkyCover::Few => "Few clouds",
            SkyCover::Scattered => "Scattered clouds",
            SkyCover::Broken => "Broken clouds",
            SkyCover::Overcast => "Overcast",
            SkyCover::Obscured => "Sky obscured",
            SkyCover::Unknown => "Unknown",
        }
    }

    /// Whether this cover leaves the ceiling VFR: clear skies (SKC/CLR),
    /// ceiling-and-visibility-okay, and the partial covers that do not
    /// form a ceiling (FEW/SCT).
    pub fn is_vfr_ceiling(&self) -> bool {
        matches!(
            self,
            SkyCover::SkyClear
                | SkyCover::Clear
                | SkyCover::Cavok
                | SkyCover::Few
                | SkyCover::Scattered
        )
    }

    pub const fn all() -> &'static [SkyCover] {
        &[
            SkyCover::SkyClear,
            SkyCover::Clear,
            SkyCover::Cavok,
            SkyCover::Few,
            SkyCover::Scattered,
            SkyCover::Broken,
            SkyCover::Overcast,
            SkyCover::Obscured,
            SkyCover::Unknown,
        ]
    }
}

impl std::fmt::Display for SkyCover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Flight category as reported by the source, never recomputed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    #[default]
    Unknown,
}

impl FlightCategory {
    pub fn from_code(code: &str) -> Self {
        match code {
            "VFR" => FlightCategory::Vfr,
            "MVFR" => FlightCategory::Mvfr,
            "IFR" => FlightCategory::Ifr,
            "LIFR" => FlightCategory::Lifr,
            _ => FlightCategory::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Unknown => "???",
        }
    }

    pub const fn all() -> &'static [FlightCategory] {
        &[
            FlightCategory::Vfr,
            FlightCategory::Mvfr,
            FlightCategory::Ifr,
            FlightCategory::Lifr,
            FlightCategory::Unknown,
        ]
    }
}

impl std::fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Routine report (METAR) or special, off-cycle report (SPECI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportType {
    Metar,
    Speci,
    #[default]
    Unknown,
}

impl ReportType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "METAR" => ReportType::Metar,
            "SPECI" => ReportType::Speci,
            _ => ReportType::Unknown,
        }
    }
}

/// Quality-control flags attached to a report. A flag is set only when the
/// source document spells the corresponding element as "true" (any case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QualityFlags {
    pub corrected: bool,
    pub auto: bool,
    pub auto_station: bool,
    pub maintenance: bool,
    pub no_signal: bool,
    pub lightning_sensor_off: bool,
    pub freezing_rain_sensor_off: bool,
    pub weather_sensor_off: bool,
}

impl QualityFlags {
    /// True when the report came from an automated source.
    pub fn automated(&self) -> bool {
        self.auto || self.auto_station
    }

    /// Short codes for every set flag, space-joined in canonical order.
    pub fn summary(&self) -> String {
        let mut codes: Vec<&str> = Vec::new();
        if self.corrected {
            codes.push("COR");
        }
        if self.auto {
            codes.push("AUTO");
        }
        if self.auto_station {
            codes.push("AUTOST");
        }
        if self.maintenance {
            codes.push("MAINT");
        }
        if self.no_signal {
            codes.push("NOSIG");
        }
        if self.lightning_sensor_off {
            codes.push("NOLTN");
        }
        if self.freezing_rain_sensor_off {
            codes.push("NOFRZ");
        }
        if self.weather_sensor_off {
            codes.push("INOP");
        }
        codes.join(" ")
    }
}

/// One reported sky-condition layer, kept in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyLayer {
    pub cover: SkyCover,
    /// Height of the layer base above ground level. `None` for clear-sky
    /// covers and whenever the station did not report one.
    pub base_ft_agl: Option<i32>,
}

/// A single decoded METAR/SPECI observation.
///
/// Every reading the source document may omit is an `Option`; `None` means
/// the station did not report it, which stays distinguishable from a
/// genuine zero reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherRecord {
    pub raw_text: String,
    pub station_id: String,
    pub observation_time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temp_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    /// Degrees true; `Some(0)` means variable wind when a speed is present.
    pub wind_dir_degrees: Option<i32>,
    pub wind_speed_kt: Option<i32>,
    pub wind_gust_kt: Option<i32>,
    pub visibility_statute_mi: Option<f64>,
    pub altim_in_hg: Option<f64>,
    pub sea_level_pressure_mb: Option<f64>,
    pub quality_flags: QualityFlags,
    /// Encoded present-weather groups, empty when none reported.
    pub wx_string: String,
    pub sky_layers: Vec<SkyLayer>,
    pub flight_category: FlightCategory,
    pub three_hr_pressure_tendency_mb: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub max_temp_24hr_c: Option<f64>,
    pub min_temp_24hr_c: Option<f64>,
    pub precip_in: Option<f64>,
    pub precip_3hr_in: Option<f64>,
    pub precip_6hr_in: Option<f64>,
    pub precip_24hr_in: Option<f64>,
    pub snow_in: Option<f64>,
    pub vert_vis_ft: Option<i32>,
    pub report_type: ReportType,
    pub elevation_m: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_cover_code_roundtrip() {
        for cover in SkyCover::all() {
            let parsed = SkyCover::from_code(cover.code());
            assert_eq!(*cover, parsed);
        }
    }

    #[test]
    fn unrecognized_sky_cover_is_unknown() {
        assert_eq!(SkyCover::from_code("VV012"), SkyCover::Unknown);
        assert_eq!(SkyCover::Unknown.label(), "Unknown");
    }

    #[test]
    fn vfr_ceiling_covers() {
        let vfr = [
            SkyCover::SkyClear,
            SkyCover::Clear,
            SkyCover::Cavok,
            SkyCover::Few,
            SkyCover::Scattered,
        ];
        for cover in SkyCover::all() {
            assert_eq!(cover.is_vfr_ceiling(), vfr.contains(cover), "{cover}");
        }
    }

    #[test]
    fn sky_cover_labels() {
        assert_eq!(SkyCover::Broken.label(), "Broken clouds");
        assert_eq!(SkyCover::Cavok.label(), "Ceiling/visibility okay");
        assert_eq!(SkyCover::Obscured.label(), "Sky obscured");
    }

    #[test]
    fn flight_category_code_roundtrip() {
        for category in FlightCategory::all() {
            let parsed = FlightCategory::from_code(category.code());
            assert_eq!(*category, parsed);
        }
        assert_eq!(FlightCategory::from_code("IMC"), FlightCategory::Unknown);
    }

    #[test]
    fn report_type_from_code() {
        assert_eq!(ReportType::from_code("METAR"), ReportType::Metar);
        assert_eq!(ReportType::from_code("SPECI"), ReportType::Speci);
        assert_eq!(ReportType::from_code("TAF"), ReportType::Unknown);
    }

    #[test]
    fn quality_flags_summary_keeps_canonical_order() {
        let flags = QualityFlags {
            corrected: true,
            auto: true,
            auto_station: true,
            maintenance: true,
            no_signal: true,
            lightning_sensor_off: true,
            freezing_rain_sensor_off: true,
            weather_sensor_off: true,
        };
        assert_eq!(
            flags.summary(),
            "COR AUTO AUTOST MAINT NOSIG NOLTN NOFRZ INOP"
        );

        let partial = QualityFlags {
            auto_station: true,
            maintenance: true,
            ..QualityFlags::default()
        };
        assert_eq!(partial.summary(), "AUTOST MAINT");
        assert_eq!(QualityFlags::default().summary(), "");
    }

    #[test]
    fn automated_covers_both_flags() {
        assert!(!QualityFlags::default().automated());
        let auto = QualityFlags {
            auto: true,
            ..QualityFlags::default()
        };
        let auto_station = QualityFlags {
            auto_station: true,
            ..QualityFlags::default()
        };
        assert!(auto.automated());
        assert!(auto_station.automated());
    }

    #[test]
    fn default_record_reports_nothing() {
        let record = WeatherRecord::default();
        assert_eq!(record.temp_c, None);
        assert_eq!(record.wind_dir_degrees, None);
        assert_eq!(record.observation_time, None);
        assert!(record.sky_layers.is_empty());
        assert_eq!(record.flight_category, FlightCategory::Unknown);
        assert_eq!(record.report_type, ReportType::Unknown);
    }
}
