//! INI file configuration adapter.

use crate::domain::error::VolbreakError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VolbreakError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_string(&content).map_err(|reason| VolbreakError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn section_params(&self, section: &str) -> Result<HashMap<String, f64>, VolbreakError> {
        let map = self.config.get_map_ref();
        let Some(entries) = map.get(&section.to_lowercase()) else {
            return Ok(HashMap::new());
        };

        let mut params = HashMap::new();
        for (key, value) in entries {
            let raw = value.as_deref().unwrap_or("").trim();
            let number = match raw.parse::<f64>() {
                Ok(n) => n,
                Err(_) => match Self::parse_bool(raw) {
                    Some(flag) => f64::from(u8::from(flag)),
                    None => {
                        return Err(VolbreakError::ConfigInvalid {
                            section: section.to_string(),
                            key: key.clone(),
                            reason: format!("'{raw}' is not a number or boolean"),
                        })
                    }
                },
            };
            params.insert(key.clone(), number);
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[backtest]
initial_capital = 10000
commission_rate = 0.001
data_dir = ./data
symbol = BTCUSDT
timeframe = 1h

[strategy]
breakoutFactor = 0.3
profit_factor = 2.5
useATR = yes
trendFilter = false
"#;

    #[test]
    fn reads_backtest_section() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), Some("BTCUSDT".to_string()));
        assert_eq!(adapter.get_double("backtest", "initial_capital", 0.0), 10000.0);
        assert_eq!(adapter.get_double("backtest", "commission_rate", 0.0), 0.001);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_double("backtest", "missing", 99.9), 99.9);
    }

    #[test]
    fn non_numeric_falls_back() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_capital", 99.9), 99.9);
    }

    #[test]
    fn bool_words_become_flags() {
        let adapter = FileConfigAdapter::from_string(
            "[s]\na = true\nb = yes\nc = on\nd = false\ne = no\nf = off\n",
        )
        .unwrap();
        let params = adapter.section_params("s").unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(params[key], 1.0);
        }
        for key in ["d", "e", "f"] {
            assert_eq!(params[key], 0.0);
        }
    }

    #[test]
    fn section_params_maps_numbers_and_flags() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        let params = adapter.section_params("strategy").unwrap();
        assert_eq!(params.len(), 4);
        // keys arrive lowercased; the engine matches them case-insensitively
        assert_eq!(params["breakoutfactor"], 0.3);
        assert_eq!(params["profit_factor"], 2.5);
        assert_eq!(params["useatr"], 1.0);
        assert_eq!(params["trendfilter"], 0.0);
    }

    #[test]
    fn section_params_missing_section_is_empty() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol = X\n").unwrap();
        assert!(adapter.section_params("strategy").unwrap().is_empty());
    }

    #[test]
    fn section_params_rejects_text() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nbreakoutFactor = quarter\n").unwrap();
        let err = adapter.section_params("strategy").unwrap_err();
        assert!(matches!(err, VolbreakError::ConfigInvalid { ref key, .. } if key == "breakoutfactor"));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("backtest", "timeframe"), Some("1h".to_string()));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(VolbreakError::Io(_))));
    }
}
