use std::io;
use std::time::{Duration, Instant};

use guard_proto::Coordinate;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// One device fix. The engine only ever consumes the latest value.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub coordinate: Coordinate,
    pub ts: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// Location access is unavailable. Terminal: monitoring cannot proceed
    /// without a position.
    #[error("location access denied")]
    PermissionDenied,
    #[error("position stream ended")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionConfig {
    /// "nmea-serial" | "nmea-file"
    pub source: String,
    pub nmea_device: Option<String>,
    pub baud: Option<u32>,
    pub nmea_file: Option<String>,
    /// Minimum seconds between delivered fixes while stationary.
    pub min_interval_s: u64,
    /// Movement below this many meters does not force an early fix.
    pub distance_filter_m: f64,
}

impl PositionConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_s)
    }
}

pub enum PositionSource {
    NmeaSerial(BufReader<SerialStream>),
    NmeaFile(BufReader<File>),
    /// Push-driven feed: positions delivered by some other producer.
    Channel(mpsc::Receiver<Position>),
}

impl PositionSource {
    pub fn serial(dev: &str, baud: u32) -> Result<Self, PositionError> {
        let port = tokio_serial::new(dev, baud)
            .open_native_async()
            .map_err(serial_open_err)?;
        Ok(Self::NmeaSerial(BufReader::new(port)))
    }

    pub fn file(path: &str) -> Result<Self, PositionError> {
        let f = std::fs::File::open(path).map_err(open_err)?;
        Ok(Self::NmeaFile(BufReader::new(File::from_std(f))))
    }

    pub fn channel(rx: mpsc::Receiver<Position>) -> Self {
        Self::Channel(rx)
    }

    /// Next raw fix, before any cadence/distance filtering.
    pub async fn next_position(&mut self) -> Result<Position, PositionError> {
        match self {
            Self::NmeaSerial(r) => next_nmea(r, false).await,
            Self::NmeaFile(r) => next_nmea(r, true).await,
            Self::Channel(rx) => rx.recv().await.ok_or(PositionError::Closed),
        }
    }
}

async fn next_nmea<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    tail_at_eof: bool,
) -> Result<Position, PositionError> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            if tail_at_eof {
                // replay file: wait for appended sentences
                tokio::time::sleep(Duration::from_millis(500)).await;
                continue;
            }
            return Err(PositionError::Closed);
        }
        if let Some(p) = parse_rmc(line.trim()) {
            return Ok(p);
        }
    }
}

fn serial_open_err(e: tokio_serial::Error) -> PositionError {
    if matches!(e.kind, tokio_serial::ErrorKind::Io(io::ErrorKind::PermissionDenied)) {
        PositionError::PermissionDenied
    } else {
        PositionError::Io(io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

fn open_err(e: io::Error) -> PositionError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        PositionError::PermissionDenied
    } else {
        PositionError::Io(e)
    }
}

// Minimal NMEA parsing: RMC carries lat/lon plus a validity flag; everything
// else is skipped.
fn parse_rmc(s: &str) -> Option<Position> {
    if !(s.starts_with("$GNRMC") || s.starts_with("$GPRMC")) {
        return None;
    }
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() <= 6 {
        return None;
    }
    // parts[2]=status (A=active, V=void), parts[3]=lat ddmm.mmmm, parts[4]=N/S,
    // parts[5]=lon dddmm.mmmm, parts[6]=E/W
    if parts[2] != "A" {
        return None;
    }
    let lat = parse_deg_min(parts[3], parts[4])?;
    let lon = parse_deg_min(parts[5], parts[6])?;
    Some(Position {
        coordinate: Coordinate { lat, lon },
        ts: OffsetDateTime::now_utc(),
    })
}

fn parse_deg_min(v: &str, hemi: &str) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    // lat: ddmm.mmmm, lon: dddmm.mmmm
    let dot = v.find('.')?;
    let deg_len = if dot > 4 { 3 } else { 2 };
    let deg: f64 = v[..deg_len].parse().ok()?;
    let min: f64 = v[deg_len..].parse().ok()?;
    let mut out = deg + (min / 60.0);
    if hemi == "S" || hemi == "W" {
        out = -out;
    }
    Some(out)
}

/// Cadence/movement gate in front of a raw source: a fix passes once the
/// minimum interval has elapsed or the device moved at least the distance
/// filter. The first fix always passes.
#[derive(Debug, Clone)]
pub struct PositionFilter {
    min_interval: Duration,
    distance_filter_m: f64,
    last: Option<(Coordinate, Instant)>,
}

impl PositionFilter {
    pub fn new(min_interval: Duration, distance_filter_m: f64) -> Self {
        Self { min_interval, distance_filter_m, last: None }
    }

    pub fn accept(&mut self, p: &Position, now: Instant) -> bool {
        let pass = match self.last {
            None => true,
            Some((prev, at)) => {
                now.duration_since(at) >= self.min_interval
                    || crate::geo::distance_m(prev, p.coordinate) >= self.distance_filter_m
            }
        };
        if pass {
            self.last = Some((p.coordinate, now));
        }
        pass
    }
}

/// A raw source plus its filter; what the monitor actually consumes.
pub struct PositionFeed {
    source: PositionSource,
    filter: PositionFilter,
}

impl PositionFeed {
    pub fn new(source: PositionSource, filter: PositionFilter) -> Self {
        Self { source, filter }
    }

    pub async fn next(&mut self) -> Result<Position, PositionError> {
        loop {
            let p = self.source.next_position().await?;
            if self.filter.accept(&p, Instant::now()) {
                return Ok(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_rmc_sentence() {
        let p = parse_rmc("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
            .unwrap();
        assert!((p.coordinate.lat - 48.1173).abs() < 1e-4);
        assert!((p.coordinate.lon - 11.5167).abs() < 1e-4);
    }

    #[test]
    fn southern_and_western_hemispheres_negate() {
        let p = parse_rmc("$GNRMC,081836,A,3751.650,S,14507.360,W,000.0,360.0,130998,011.3,E*62")
            .unwrap();
        assert!(p.coordinate.lat < 0.0);
        assert!(p.coordinate.lon < 0.0);
    }

    #[test]
    fn void_fixes_and_other_sentences_are_skipped() {
        assert!(parse_rmc("$GPRMC,123519,V,4807.038,N,01131.000,E,022.4,084.4,230394,,*6A")
            .is_none());
        assert!(parse_rmc("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,,,,*47")
            .is_none());
        assert!(parse_rmc("garbage").is_none());
    }

    #[test]
    fn filter_gates_on_interval_and_distance() {
        let mut f = PositionFilter::new(Duration::from_secs(5), 10.0);
        let t0 = Instant::now();
        let here = Position {
            coordinate: Coordinate { lat: 27.7000, lon: 85.3000 },
            ts: OffsetDateTime::now_utc(),
        };
        // ~22 m north
        let moved = Position {
            coordinate: Coordinate { lat: 27.7002, lon: 85.3000 },
            ts: OffsetDateTime::now_utc(),
        };

        assert!(f.accept(&here, t0), "first fix always passes");
        assert!(!f.accept(&here, t0 + Duration::from_secs(1)), "stationary inside interval");
        assert!(f.accept(&moved, t0 + Duration::from_secs(1)), "movement beats the interval");
        assert!(!f.accept(&moved, t0 + Duration::from_secs(2)));
        assert!(f.accept(&moved, t0 + Duration::from_secs(8)), "interval elapsed");
    }

    #[tokio::test]
    async fn file_source_yields_fixes_in_order() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,,,,*47").unwrap();
        writeln!(tmp, "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
            .unwrap();
        writeln!(tmp, "$GPRMC,123520,A,4807.100,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
            .unwrap();

        let mut src = PositionSource::file(tmp.path().to_str().unwrap()).unwrap();
        let a = src.next_position().await.unwrap();
        let b = src.next_position().await.unwrap();
        assert!(b.coordinate.lat > a.coordinate.lat);
    }

    #[tokio::test]
    async fn channel_source_ends_when_producer_drops() {
        let (tx, rx) = mpsc::channel(4);
        let mut src = PositionSource::channel(rx);
        drop(tx);
        assert!(matches!(
            src.next_position().await,
            Err(PositionError::Closed)
        ));
    }
}
