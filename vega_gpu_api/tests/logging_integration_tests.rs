//! Integration tests for logging across API operations
//!
//! Errors raised by the public API must reach a caller-installed logger
//! with their source module and, for errors, file and line details. The
//! global logger is process-wide state, so these tests are serialized.


use std::sync::{Arc, Mutex};

use serial_test::serial;
use vega_gpu_api::log::{reset_logger, set_logger};
use vega_gpu_api::vega::device::RasterDevice;
use vega_gpu_api::vega::log::{LogEntry, LogSeverity, Logger};
use vega_gpu_api::vega::GpuApi;

use device_test_utils::{MemoryAssets, TestDevice};

struct CapturingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capturing_logger() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    set_logger(Box::new(CapturingLogger {
        entries: entries.clone(),
    }));
    entries
}

fn build_api(device: &Arc<Mutex<TestDevice>>) -> vega_gpu_api::vega::Result<GpuApi> {
    let dynamic: Arc<Mutex<dyn RasterDevice>> = device.clone();
    GpuApi::new(dynamic, Arc::new(MemoryAssets::default()), 640, 480, true)
}

#[test]
#[serial]
fn test_missing_capability_is_logged_with_details() {
    let entries = install_capturing_logger();

    let device = TestDevice::new();
    device.lock().unwrap().capabilities.float_color_targets = false;
    let result = build_api(&device);
    assert!(result.is_err());

    {
        let captured = entries.lock().unwrap();
        let error = captured
            .iter()
            .find(|entry| entry.severity == LogSeverity::Error)
            .unwrap();
        assert_eq!(error.source, "vega::GpuApi");
        assert!(error.message.contains("floating point"));
        assert!(error.file.is_some());
        assert!(error.line.is_some());
    }

    reset_logger();
}

#[test]
#[serial]
fn test_construction_logs_device_limits() {
    let entries = install_capturing_logger();

    let device = TestDevice::new();
    let api = build_api(&device).unwrap();

    {
        let captured = entries.lock().unwrap();
        let info = captured
            .iter()
            .find(|entry| entry.severity == LogSeverity::Info)
            .unwrap();
        assert_eq!(info.source, "vega::GpuApi");
        assert!(info.message.contains("color attachments"));
    }

    drop(api);
    reset_logger();
}
