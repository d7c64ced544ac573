//! Integration tests for logger system
//!
//! These tests verify:
//! - Level gating and line layout end to end
//! - Rank resolution from launcher environments
//! - Rank gating across every sink
//! - Primary file lifecycle under reconfiguration
//! - Ad hoc file dispatch
//! - JSON configuration

use parking_lot::Mutex;
use ranklog::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct CaptureAppender {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureAppender {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Appender for CaptureAppender {
    fn append(&mut self, line: &str) -> Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "capture"
    }
}

fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// `YYYY-MM-DD HH:MM:SS,mmm`
fn is_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 23
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            19 => *b == b',',
            _ => b.is_ascii_digit(),
        })
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read log file")
}

#[test]
fn test_end_to_end_level_threshold() {
    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .level(20)
        .console(capture.clone())
        .build()
        .unwrap();

    logger.log(30, "hello");
    logger.log(10, "hidden");

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    let (stamp, rest) = lines[0].split_at(23);
    assert!(is_timestamp(stamp), "bad timestamp in {:?}", lines[0]);
    assert_eq!(rest, " | T | WARNING | hello");
}

#[test]
fn test_level_tokens() {
    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .level(LogLevel::DEBUG)
        .console(capture.clone())
        .build()
        .unwrap();

    let cases = [
        (LogLevel::DEBUG, "DEBUG"),
        (LogLevel::INFO, "INFO"),
        (LogLevel::WARNING, "WARNING"),
        (LogLevel::ERROR, "ERROR"),
        (LogLevel::CRITICAL, "CRITICAL"),
    ];
    for (level, _) in cases {
        logger.log(level, "msg");
    }

    let lines = capture.lines();
    for (line, (_, token)) in lines.iter().zip(cases) {
        assert!(is_timestamp(&line[..23]));
        assert_eq!(&line[23..], format!(" | T | {} | msg", token));
    }
}

#[test]
fn test_mpirun_detection() {
    let logger = Logger::builder("T")
        .use_rank(true)
        .auto_detect_env("mpirun")
        .env(env(&[("OMPI_COMM_WORLD_RANK", "8"), ("OMPI_COMM_WORLD_SIZE", "34")]))
        .build()
        .unwrap();
    assert_eq!(logger.rank_info(), RankInfo::new(8, 34));
}

#[test]
fn test_torchrun_detection_defaults_when_unset() {
    let logger = Logger::builder("T")
        .use_rank(true)
        .auto_detect_env("torchrun")
        .env(env(&[("OMPI_COMM_WORLD_RANK", "8"), ("OMPI_COMM_WORLD_SIZE", "34")]))
        .build()
        .unwrap();
    assert_eq!(logger.rank_info(), RankInfo::new(0, 1));
}

#[test]
fn test_explicit_rank_beats_environment() {
    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .use_rank(true)
        .rank(3)
        .world_size(8)
        .auto_detect_env(AutoDetect::All)
        .env(env(&[("RANK", "1"), ("WORLD_SIZE", "2")]))
        .console(capture.clone())
        .build()
        .unwrap();

    logger.log(LogLevel::INFO, "x");
    assert!(capture.lines()[0].starts_with("[3/8] "));
}

#[test]
fn test_log_rank_silences_every_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let primary = temp_dir.path().join("primary.log");
    let adhoc = temp_dir.path().join("adhoc.log");
    let capture = CaptureAppender::default();

    let logger = Logger::builder("T")
        .file(&primary)
        .rank(2)
        .log_rank(5)
        .env(HashMap::<String, String>::new())
        .console(capture.clone())
        .build()
        .unwrap();

    logger.log(LogLevel::NOTSET, "a\n");
    logger.log(LogLevel::CRITICAL, "b\n");
    logger.log_with(LogLevel::ERROR, "c\n", &LogOptions::new().new_file(&adhoc));
    logger.flush().unwrap();

    assert!(capture.lines().is_empty());
    assert_eq!(read(&primary), "");
    assert!(!adhoc.exists());
}

#[test]
fn test_reconfigure_same_path_does_not_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");

    let logger = Logger::builder("T")
        .file(&path)
        .mode(FileMode::Truncate)
        .console(CaptureAppender::default())
        .build()
        .unwrap();

    logger.log(LogLevel::NOTSET, "first\n");
    logger.flush().unwrap();

    logger
        .reconfigure(Reconfigure::new().file_path(&path).mode(FileMode::Truncate).name("U"))
        .unwrap();
    logger.log(LogLevel::NOTSET, "second\n");
    logger.flush().unwrap();

    assert_eq!(read(&path), "first\nsecond\n");
    assert_eq!(logger.name(), "U");
}

#[test]
fn test_append_mode_keeps_existing_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");
    fs::write(&path, "old\n").unwrap();

    let logger = Logger::builder("T")
        .file(&path)
        .console(CaptureAppender::default())
        .build()
        .unwrap();
    logger.log(LogLevel::NOTSET, "new\n");
    drop(logger);

    assert_eq!(read(&path), "old\nnew\n");
}

#[test]
fn test_new_file_leaves_primary_untouched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let primary = temp_dir.path().join("primary.log");
    let adhoc = temp_dir.path().join("side/adhoc.log");
    fs::write(&primary, "kept\n").unwrap();

    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .file(&primary)
        .console(capture.clone())
        .build()
        .unwrap();

    logger.log_with(LogLevel::NOTSET, "side\n", &LogOptions::new().new_file(&adhoc));
    logger.flush().unwrap();

    assert_eq!(read(&primary), "kept\n");
    assert_eq!(read(&adhoc), "side\n");
    assert_eq!(capture.lines(), vec!["side\n"]);
    assert_eq!(logger.file_path(), Some(primary));
}

#[test]
fn test_new_file_does_not_create_primary() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adhoc = temp_dir.path().join("adhoc.log");

    let logger = Logger::builder("T")
        .console(CaptureAppender::default())
        .build()
        .unwrap();
    logger.log_with(LogLevel::NOTSET, "one\n", &LogOptions::new().new_file(&adhoc));
    logger.log_with(LogLevel::NOTSET, "two\n", &LogOptions::new().new_file(&adhoc));

    assert_eq!(read(&adhoc), "one\ntwo\n");
    let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_new_file_failure_is_not_fatal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .console(capture.clone())
        .build()
        .unwrap();

    // A directory cannot be opened for appending
    logger.log_with(
        LogLevel::NOTSET,
        "console still works\n",
        &LogOptions::new().new_file(temp_dir.path()),
    );
    assert_eq!(capture.lines(), vec!["console still works\n"]);
}

#[test]
fn test_rank_prefix_reaches_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("ranked.log");

    let logger = Logger::builder("T")
        .file(&path)
        .use_rank(true)
        .auto_detect_env(AutoDetect::All)
        .env(env(&[("SLURM_PROCID", "4"), ("SLURM_NTASKS", "6")]))
        .console(CaptureAppender::default())
        .build()
        .unwrap();

    logger.info("ranked line");
    logger.flush().unwrap();

    let content = read(&path);
    assert!(content.starts_with("[4/6] "));
    assert!(content.ends_with(" | T | INFO | ranked line\n"));
}

#[test]
fn test_drop_flushes_primary_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("drop.log");

    {
        let logger = Logger::builder("T")
            .file(&path)
            .console(CaptureAppender::default())
            .build()
            .unwrap();
        for i in 0..10 {
            logger.log(LogLevel::NOTSET, format!("line {}\n", i));
        }
    }

    assert_eq!(read(&path).lines().count(), 10);
}

#[test]
fn test_drop_flushes_during_unwind() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("panic.log");
    let path_clone = path.clone();

    let result = std::panic::catch_unwind(move || {
        let logger = Logger::builder("T")
            .file(&path_clone)
            .console(CaptureAppender::default())
            .build()
            .unwrap();
        logger.log(LogLevel::NOTSET, "written before panic\n");
        panic!("simulated failure");
    });

    assert!(result.is_err());
    assert_eq!(read(&path), "written before panic\n");
}

#[test]
fn test_logger_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("configured/app.log");
    let json = format!(
        r#"{{"name": "svc", "file_path": {:?}, "level": 30, "rank": 1, "world_size": 2, "use_rank": true}}"#,
        path.display().to_string()
    );

    let config = LoggerConfig::from_json(&json).unwrap();
    let logger = Logger::from_config(config).unwrap();
    assert!(logger.is_file_open());

    logger.info("suppressed");
    logger.error("kept");
    logger.flush().unwrap();

    let content = read(&path);
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("[1/2] "));
    assert!(content.contains(" | svc | ERROR | kept"));
}

#[test]
fn test_reconfigure_from_json_update() {
    let capture = CaptureAppender::default();
    let logger = Logger::builder("T")
        .level(LogLevel::ERROR)
        .console(capture.clone())
        .build()
        .unwrap();

    logger.warning("hidden");
    let update = Reconfigure::from_json(r#"{"level": 10, "name": "renamed"}"#).unwrap();
    logger.reconfigure(update).unwrap();
    logger.warning("shown");

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(" | renamed | WARNING | shown"));
}

#[test]
fn test_process_env_reads_real_environment() {
    assert_eq!(ProcessEnv.var("RANKLOG_TEST_SURELY_UNSET_VARIABLE"), None);
}
