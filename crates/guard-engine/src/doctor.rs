use anyhow::Result;

use crate::monitor::MonitorConfig;
use crate::position::PositionConfig;

pub fn check_monitor(cfg: &MonitorConfig) -> Result<()> {
    anyhow::ensure!(
        cfg.threshold_m > 0.0 && cfg.threshold_m <= 10_000.0,
        "monitor.threshold_m should be within 0..10000"
    );
    anyhow::ensure!(
        cfg.re_alert_interval_s >= 1,
        "monitor.re_alert_interval_s too small; alerts would storm"
    );
    anyhow::ensure!(
        cfg.refresh_interval_s >= 5,
        "monitor.refresh_interval_s too small; set >= 5s"
    );
    Ok(())
}

pub fn check_position(cfg: &PositionConfig) -> Result<()> {
    match cfg.source.as_str() {
        "nmea-serial" => anyhow::ensure!(
            cfg.nmea_device.as_ref().map(|s| !s.is_empty()).unwrap_or(false),
            "position.nmea_device missing"
        ),
        "nmea-file" => anyhow::ensure!(
            cfg.nmea_file.as_ref().map(|s| !s.is_empty()).unwrap_or(false),
            "position.nmea_file missing"
        ),
        other => anyhow::bail!("unknown position.source: {}", other),
    }
    anyhow::ensure!(
        cfg.distance_filter_m >= 0.0,
        "position.distance_filter_m must not be negative"
    );
    anyhow::ensure!(
        cfg.min_interval_s <= 300,
        "position.min_interval_s should be <= 300"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_cfg() -> MonitorConfig {
        MonitorConfig {
            threshold_m: 100.0,
            re_alert_interval_s: 10,
            refresh_interval_s: 30,
        }
    }

    #[test]
    fn accepts_shipped_defaults() {
        assert!(check_monitor(&monitor_cfg()).is_ok());
    }

    #[test]
    fn rejects_storm_prone_intervals() {
        let mut cfg = monitor_cfg();
        cfg.re_alert_interval_s = 0;
        assert!(check_monitor(&cfg).is_err());
    }

    #[test]
    fn rejects_unknown_position_source() {
        let cfg = PositionConfig {
            source: "gps-magic".to_string(),
            nmea_device: None,
            baud: None,
            nmea_file: None,
            min_interval_s: 5,
            distance_filter_m: 10.0,
        };
        assert!(check_position(&cfg).is_err());
    }
}
