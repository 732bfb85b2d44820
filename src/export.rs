use std::io::Write;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::data::model::Spectrum;
use crate::error::Result;
use crate::units::FrequencyUnit;

/// Output format for a synthesised spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma separated, one header row.
    Csv,
    /// Whitespace aligned text table, `#` header.
    Dat,
    /// `{ "unit": .., "x": [..], "y": [..] }`
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to `Dat`.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => OutputFormat::Csv,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Dat,
        }
    }
}

fn x_header(unit: FrequencyUnit) -> String {
    format!("v [{}]", unit.label())
}

/// Write `spectrum` as CSV with a `v [unit]`, `I(v) [AU]` header.
pub fn write_csv<W: Write>(writer: W, spectrum: &Spectrum, unit: FrequencyUnit) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([x_header(unit).as_str(), "I(v) [AU]"])?;
    for (x, y) in spectrum.x.iter().zip(&spectrum.y) {
        csv_writer.write_record([x.to_string(), y.to_string()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `spectrum` as an aligned text table, header prefixed by `#`.
pub fn write_dat<W: Write>(mut writer: W, spectrum: &Spectrum, unit: FrequencyUnit) -> Result<()> {
    writeln!(writer, "# {:>16}  {:>16}", x_header(unit), "I(v) [AU]")?;
    for (x, y) in spectrum.x.iter().zip(&spectrum.y) {
        writeln!(writer, "  {x:>16.8e}  {y:>16.8e}")?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonSpectrum<'a> {
    unit: FrequencyUnit,
    x: &'a [f64],
    y: &'a [f64],
}

/// Serialise `spectrum` with its unit as a JSON object.
pub fn to_json(spectrum: &Spectrum, unit: FrequencyUnit) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonSpectrum {
        unit,
        x: &spectrum.x,
        y: &spectrum.y,
    })?)
}

/// Write `spectrum` in `format`.
pub fn write_spectrum<W: Write>(
    mut writer: W,
    spectrum: &Spectrum,
    unit: FrequencyUnit,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(writer, spectrum, unit),
        OutputFormat::Dat => write_dat(writer, spectrum, unit),
        OutputFormat::Json => {
            writeln!(writer, "{}", to_json(spectrum, unit)?)?;
            Ok(())
        }
    }
}

/// Write `spectrum` to `path`, format chosen from the extension.
pub fn save(path: &Path, spectrum: &Spectrum, unit: FrequencyUnit) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_spectrum(file, spectrum, unit, OutputFormat::from_path(path))?;
    info!("Wrote {} samples to {}", spectrum.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum() -> Spectrum {
        Spectrum {
            x: vec![0.0, 0.5, 1.0],
            y: vec![0.0, 2.0, 0.25],
        }
    }

    #[test]
    fn csv_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &spectrum(), FrequencyUnit::Thz).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "v [THz],I(v) [AU]");
        assert_eq!(lines[2], "0.5,2");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn dat_output() {
        let mut buf = Vec::new();
        write_dat(&mut buf, &spectrum(), FrequencyUnit::InvCm).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with('#'));
        assert!(header.contains("v [cm^-1]"));
        let row: Vec<f64> = lines
            .nth(1)
            .unwrap()
            .split_whitespace()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(row, vec![0.5, 2.0]);
    }

    #[test]
    fn dat_keeps_fine_x_steps() {
        let x: Vec<f64> = (0..5).map(|i| 12.0 + 0.0005 * i as f64).collect();
        let sp = Spectrum {
            y: vec![1.0; x.len()],
            x,
        };
        let mut buf = Vec::new();
        write_dat(&mut buf, &sp, FrequencyUnit::Thz).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let parsed: Vec<f64> = text
            .lines()
            .skip(1)
            .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(parsed.len(), sp.x.len());
        for (a, b) in parsed.iter().zip(&sp.x) {
            assert!((a - b).abs() < 1e-7, "{a} vs {b}");
        }
        assert!(parsed.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn json_output() {
        let text = to_json(&spectrum(), FrequencyUnit::Mev).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["unit"], "mev");
        assert_eq!(value["y"][1], 2.0);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("a.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("a.dat")), OutputFormat::Dat);
        assert_eq!(OutputFormat::from_path(Path::new("spectrum")), OutputFormat::Dat);
    }
}
