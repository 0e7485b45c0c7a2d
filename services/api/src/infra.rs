use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use offboarding::workflows::relieving::{
    ClearanceConfig, FacultyId, FacultyProfile, InMemoryRelievingRepository,
    RelievingClearanceService, StaticFacultyDirectory,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryClearanceService =
    RelievingClearanceService<InMemoryRelievingRepository, StaticFacultyDirectory>;

/// Faculty records served until an HR directory is wired in.
pub(crate) fn demo_directory() -> StaticFacultyDirectory {
    [
        ("fac-101", "Dr. Meera Iyer", "EMP-0457", "dept-cse"),
        ("fac-214", "Prof. Daniel Okafor", "EMP-0612", "dept-physics"),
        ("fac-330", "Dr. Lina Haddad", "EMP-0788", "dept-mech"),
    ]
    .into_iter()
    .fold(
        StaticFacultyDirectory::default(),
        |directory, (id, name, employee_id, department_id)| {
            directory.with_profile(
                FacultyId(id.to_string()),
                FacultyProfile {
                    name: name.to_string(),
                    employee_id: employee_id.to_string(),
                    department_id: department_id.to_string(),
                },
            )
        },
    )
}

pub(crate) fn in_memory_service(config: ClearanceConfig) -> Arc<MemoryClearanceService> {
    Arc::new(RelievingClearanceService::new(
        Arc::new(InMemoryRelievingRepository::default()),
        Arc::new(demo_directory()),
        config,
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
