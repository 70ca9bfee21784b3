//! Python bindings for gridbloom using PyO3

use crate::{BloomFilter, GridBloomError, ScanDriver, ScanReport, SimulationConfig};
use numpy::{IntoPyArray, PyArray1};
use pyo3::prelude::*;

fn to_py_err(e: GridBloomError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
}

/// Python wrapper for BloomFilter
#[pyclass(name = "BloomFilter")]
struct PyBloomFilter {
    inner: BloomFilter,
}

#[pymethods]
impl PyBloomFilter {
    #[new]
    #[pyo3(signature = (size = 4096, hash_count = 2))]
    fn new(size: usize, hash_count: u32) -> PyResult<Self> {
        let filter = BloomFilter::with_size(size, hash_count).map_err(to_py_err)?;
        Ok(PyBloomFilter { inner: filter })
    }

    fn add(&mut self, key: &str) -> PyResult<()> {
        self.inner.add(key).map_err(to_py_err)
    }

    fn not_in_set(&self, key: &str) -> PyResult<bool> {
        self.inner.not_in_set(key).map_err(to_py_err)
    }

    fn likely(&self, key: &str) -> PyResult<bool> {
        self.inner.likely(key).map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn load_factor(&self) -> f64 {
        self.inner.load_factor()
    }

    fn estimated_fpr(&self) -> f64 {
        self.inner.estimated_fpr()
    }

    /// Packed bit storage as a uint8 array
    fn array<'py>(&self, py: Python<'py>) -> &'py PyArray1<u8> {
        self.inner.as_bytes().into_pyarray(py)
    }

    fn stats(&self) -> String {
        self.inner.stats().to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "BloomFilter(size={}, hash_count={}, len={})",
            self.inner.capacity(),
            self.inner.hash_count(),
            self.inner.len()
        )
    }
}

/// Final counters of a finished scan
#[pyclass(name = "ScanReport", get_all)]
struct PyScanReport {
    checks: u64,
    hits: u64,
    misses: u64,
    false_positive_rate: Option<f64>,
    expected_rate: f64,
}

impl From<ScanReport> for PyScanReport {
    fn from(report: ScanReport) -> Self {
        PyScanReport {
            checks: report.checks,
            hits: report.hits,
            misses: report.misses,
            false_positive_rate: report.false_positive_rate,
            expected_rate: report.expected_rate,
        }
    }
}

#[pymethods]
impl PyScanReport {
    fn __repr__(&self) -> String {
        format!(
            "ScanReport(checks={}, hits={}, misses={})",
            self.checks, self.hits, self.misses
        )
    }
}

/// Run a whole simulation and return its final report
#[pyfunction]
#[pyo3(signature = (hash_count = 2, item_count = 100, filter_bits = 4096, grid_side = 150, seed = None))]
fn simulate(
    hash_count: u32,
    item_count: usize,
    filter_bits: usize,
    grid_side: u32,
    seed: Option<u64>,
) -> PyResult<PyScanReport> {
    let config = SimulationConfig {
        grid_side,
        hash_count,
        item_count,
        filter_bits,
        seed,
        ..SimulationConfig::default()
    };
    let mut driver = ScanDriver::start(&config, &mut ()).map_err(to_py_err)?;
    Ok(driver.run_to_completion(&mut ()).into())
}

/// Python module definition
#[pymodule]
fn gridbloom(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyBloomFilter>()?;
    m.add_class::<PyScanReport>()?;

    m.add_function(wrap_pyfunction!(simulate, m)?)?;

    // Add module constants
    m.add("GRID_SIDE", crate::config::DEFAULT_GRID_SIDE)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
