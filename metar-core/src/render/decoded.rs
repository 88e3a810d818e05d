use chrono::Local;

use crate::model::{SkyCover, WeatherRecord};
use crate::render::{
    BOLD_BLUE, BOLD_MAGENTA, BOLD_RED, BOLD_YELLOW, celsius_to_fahrenheit, flight_category_label,
    paint, paint_if,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the fixed multi-paragraph layout for one record. Readings the
/// record does not carry are omitted outright, never printed as
/// placeholders.
pub fn render_decoded(record: &WeatherRecord, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&record.station_id);
    if let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) {
        out.push_str(&format!(" ({latitude:.2}, {longitude:.2})"));
    }
    out.push_str(&format!(
        " [{}]",
        flight_category_label(record.flight_category, color)
    ));
    if let Some(time) = record.observation_time {
        out.push_str(&format!(" at {}", time.format(TIME_FORMAT)));
    }
    out.push('\n');
    if let Some(time) = record.observation_time {
        out.push_str(&format!(
            "(Local time: {})\n",
            time.with_timezone(&Local).format(TIME_FORMAT)
        ));
    }
    if record.quality_flags.corrected {
        out.push_str(&paint_if("Corrected version", BOLD_YELLOW, color));
        out.push('\n');
    }
    out.push('\n');

    render_winds(&mut out, record, color);
    render_visibility(&mut out, record, color);
    render_sky(&mut out, record, color);

    if let Some(temp) = record.temp_c {
        out.push_str(&format!(
            "\tTemperature: {temp:.1}°C ({:.1}°F)\n",
            celsius_to_fahrenheit(temp)
        ));
    }
    if let Some(dewpoint) = record.dewpoint_c {
        out.push_str(&format!(
            "\tDewpoint: {dewpoint:.1}°C ({:.1}°F)\n",
            celsius_to_fahrenheit(dewpoint)
        ));
    }
    if let Some(altimeter) = record.altim_in_hg {
        out.push_str(&format!(
            "\tPressure: {altimeter:.2}\" Hg ({:.1} mb)\n",
            33.85 * altimeter
        ));
    }
    if !record.wx_string.is_empty() {
        out.push_str(&format!(
            "\tAdverse weather: {}\n",
            paint_if(&record.wx_string, BOLD_YELLOW, color)
        ));
    }
    if record.quality_flags.maintenance {
        out.push_str(&format!(
            "\t{}: Station needs maintenance\n",
            paint_if("Warning", BOLD_YELLOW, color)
        ));
    }
    if record.quality_flags.weather_sensor_off {
        out.push_str(&format!(
            "\t{}: Station offline\n",
            paint_if("Warning", BOLD_RED, color)
        ));
    }
    if record.quality_flags.automated() {
        out.push_str("\tAutomated weather available.\n");
    }
    out.push_str(&format!("\t{}\n", record.raw_text));

    out
}

fn render_winds(out: &mut String, record: &WeatherRecord, color: bool) {
    let (Some(direction), Some(speed)) = (record.wind_dir_degrees, record.wind_speed_kt) else {
        return;
    };
    if direction < 0 {
        return;
    }
    if speed == 0 {
        out.push_str("\tWinds: Calm\n");
        return;
    }

    let speed_text = paint_if(&format!("{speed} knots"), BOLD_RED, color && speed >= 10);
    if direction == 0 {
        out.push_str(&format!("\tWinds: Variable at {speed_text}"));
    } else {
        out.push_str(&format!("\tWinds: {direction}° at {speed_text}"));
    }
    if let Some(gust) = record.wind_gust_kt.filter(|gust| *gust > 0) {
        let escalate = color && gust - speed >= 5;
        out.push_str(&format!(
            " {}",
            paint_if(&format!("gusting {gust} knots"), BOLD_RED, escalate)
        ));
    }
    out.push('\n');
}

fn render_visibility(out: &mut String, record: &WeatherRecord, color: bool) {
    let Some(visibility) = record.visibility_statute_mi else {
        return;
    };
    let text = format!("{visibility:.1} miles");
    let text = if color && visibility < 5.0 {
        let tier = if visibility >= 3.0 {
            BOLD_BLUE
        } else if visibility >= 1.0 {
            BOLD_RED
        } else {
            BOLD_MAGENTA
        };
        paint(&text, tier)
    } else {
        text
    };
    out.push_str(&format!("\tVisibility: {text}\n"));
}

fn render_sky(out: &mut String, record: &WeatherRecord, color: bool) {
    for layer in &record.sky_layers {
        if layer.cover == SkyCover::Clear {
            out.push_str("\tSky condition: Clear\n");
            continue;
        }
        match layer.base_ft_agl {
            Some(base) if base >= 0 => {
                let span = format!("{} at {base} feet", layer.cover.label());
                let span = if color && !layer.cover.is_vfr_ceiling() && base <= 3000 {
                    let tier = if base >= 1000 {
                        BOLD_BLUE
                    } else if base >= 500 {
                        BOLD_RED
                    } else {
                        BOLD_MAGENTA
                    };
                    paint(&span, tier)
                } else {
                    span
                };
                out.push_str(&format!("\tSky condition: {span} above ground level\n"));
            }
            _ => {
                out.push_str(&format!("\tSky condition: {}\n", layer.cover.label()));
            }
        }
    }
}
