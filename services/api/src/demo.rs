use crate::infra::{in_memory_service, MemoryClearanceService};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use offboarding::error::AppError;
use offboarding::workflows::relieving::{
    checklist_schema, CategoryChecklistView, ClearanceCategory, ClearanceConfig,
    ClearanceServiceError, FacultyId, NewRelievingRequest, RequestId, RequestStatus,
};
use serde::Serialize;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Application date for the sample request (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Reject the request with these remarks instead of finishing clearance.
    #[arg(long)]
    pub(crate) reject_with: Option<String>,
}

/// Final state of the walkthrough, printed as JSON at the end of the demo.
#[derive(Debug, Serialize)]
pub(crate) struct DemoOutcome {
    pub(crate) request_id: RequestId,
    pub(crate) status: RequestStatus,
    pub(crate) admin_remarks: Option<String>,
    pub(crate) blocked_by: Vec<ClearanceCategory>,
    pub(crate) late_write_refused: bool,
    pub(crate) checklists: Vec<CategoryChecklistView>,
}

pub(crate) fn print_checklist_schema() {
    println!("Relieving clearance checklist");
    for entry in checklist_schema() {
        println!("{} ({})", entry.category_label, entry.category.key());
        for item in entry.items {
            println!("  - {item}");
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = in_memory_service(ClearanceConfig::default());

    println!("Relieving clearance demo");
    let outcome = walkthrough(&service, args)?;

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("\nFinal request state:\n{json}"),
        Err(err) => println!("\nFinal request state unavailable: {err}"),
    }
    Ok(())
}

pub(crate) fn walkthrough(
    service: &MemoryClearanceService,
    args: DemoArgs,
) -> Result<DemoOutcome, AppError> {
    let DemoArgs { today, reject_with } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let request = service.create_request(NewRelievingRequest {
        faculty_id: FacultyId("fac-101".to_string()),
        proposed_last_working_day: Some(today + Duration::days(30)),
        reason: "Joining a research institute".to_string(),
        resignation_letter_url: Some("docs/relieving/fac-101/letter.pdf".to_string()),
        applied_date: Some(today),
    })?;
    println!(
        "- Filed {} for {} (last working day {}) -> {}",
        request.id, request.faculty_id, request.proposed_last_working_day, request.status
    );

    for category in ClearanceCategory::ordered() {
        for item in category.items() {
            let value = !(category == ClearanceCategory::Financial && *item == "advance_settled");
            service.set_item(&request.id, category, item, value)?;
        }
    }
    print_progress(service, &request.id)?;

    let blocked_by = match service.decide(&request.id, RequestStatus::Approved, None) {
        Err(ClearanceServiceError::ClearanceIncomplete { missing }) => {
            println!(
                "- Approval blocked; outstanding: {}",
                missing
                    .iter()
                    .map(|category| category.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            missing
        }
        Err(err) => return Err(err.into()),
        Ok(_) => Vec::new(),
    };

    let decided = match reject_with {
        Some(remarks) => {
            let rejected =
                service.decide(&request.id, RequestStatus::Rejected, Some(remarks.as_str()))?;
            println!("- Rejected with remarks: {remarks}");
            rejected
        }
        None => {
            service.set_item(&request.id, ClearanceCategory::Financial, "advance_settled", true)?;
            println!("- Financial cleared the outstanding advance");
            let approved = service.decide(&request.id, RequestStatus::Approved, None)?;
            println!("- Approved");
            approved
        }
    };

    let late_write_refused = match service.set_item(
        &request.id,
        ClearanceCategory::Asset,
        "id_card_returned",
        false,
    ) {
        Err(ClearanceServiceError::RequestFinalized { status, .. }) => {
            println!("- Checklist locked: request is {status}");
            true
        }
        Err(err) => return Err(err.into()),
        Ok(_) => false,
    };

    let detail = service.request_detail(&request.id)?;
    Ok(DemoOutcome {
        request_id: decided.id,
        status: detail.request.status,
        admin_remarks: detail.request.admin_remarks,
        blocked_by,
        late_write_refused,
        checklists: detail.checklists,
    })
}

fn print_progress(service: &MemoryClearanceService, id: &RequestId) -> Result<(), AppError> {
    let detail = service.request_detail(id)?;
    println!("\nClearance progress ({})", detail.status_label);
    for view in &detail.checklists {
        println!(
            "  {:<10} {:>2}/{} {}",
            view.category_label, view.completed, view.total, view.status_label
        );
    }
    println!();
    Ok(())
}
