use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::{csrf, session};
use crate::context::AppContext;
use crate::errors::{redirect, render, AppError};
use crate::models::outcome::Outcome;
use crate::models::student::{
    self, parse_action_code, DetailsForm, Document, FlagForm, NewStudentForm, NotesForm,
    SearchQuery, Stage, StageAction, StatusForm, StudentIdForm, YES,
};
use crate::templates_structs::{
    FlaggedTemplate, LhcQueueTemplate, PageContext, StudentDetailTemplate, StudentListTemplate,
    StudentRow,
};

use super::{flash_outcome, now, safe_return_path, student_url};

pub async fn list(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/students").await?;
    let students = student::list_all(&app.students).await;
    let tmpl = StudentListTemplate { ctx, students: StudentRow::build_all(&students, now()) };
    render(tmpl)
}

pub async fn create(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<NewStudentForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let outcome = student::create(&app.students, &form.app_id, &form.student_name).await?;
    let subject = format!("Student '{}'", form.app_id.trim());
    flash_outcome(&session, &outcome, &subject, "added");
    if outcome.is_success() {
        return Ok(redirect(&student_url(form.app_id.trim())));
    }
    Ok(redirect("/students"))
}

pub async fn view(
    app: web::Data<AppContext>,
    session: Session,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let Some(found) = student::find(&app.students, &query.search_term).await? else {
        session::flash_error(&session, format!("No student found for '{}'.", query.search_term.trim()));
        return Ok(redirect("/dashboard"));
    };
    let ctx = PageContext::build(&session, &app, "/students").await?;
    let tmpl = StudentDetailTemplate { ctx, student: StudentRow::build(&found, now()) };
    render(tmpl)
}

pub async fn update_status(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;
    let back = safe_return_path(&form.return_to)
        .map(str::to_string)
        .unwrap_or_else(|| student_url(&form.student_id));

    let Some((action, stage)) = parse_action_code(&form.action) else {
        session::flash_error(&session, format!("Unknown action '{}'.", form.action));
        return Ok(redirect(&back));
    };

    let outcome = student::advance_stage(
        &app.students,
        &form.student_id,
        stage,
        action,
        &caller.display_name(),
        now(),
    )
    .await?;
    let done = match action {
        StageAction::MarkDone => "marked done",
        StageAction::MarkQueue => "moved to the queue",
        StageAction::Unmark => "reset to pending",
    };
    let subject = format!("{} for '{}'", stage.label(), form.student_id.trim());
    flash_outcome(&session, &outcome, &subject, done);
    Ok(redirect(&back))
}

pub async fn update_notes(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<NotesForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let outcome = student::update_notes(&app.students, &form.student_id, &form.notes).await?;
    flash_outcome(&session, &outcome, "Notes", "saved");
    Ok(redirect(&student_url(&form.student_id)))
}

pub async fn update_details(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<DetailsForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let outcome = student::update_identity(
        &app.students,
        &form.original_student_id,
        &form.student_identifier,
        &form.student_name,
    )
    .await?;
    match outcome {
        Outcome::Success => {
            session::flash_success(&session, "Student details updated.");
            Ok(redirect(&student_url(form.student_identifier.trim())))
        }
        Outcome::Duplicate => {
            session::flash_error(
                &session,
                format!("Application ID '{}' is already in use.", form.student_identifier.trim()),
            );
            Ok(redirect(&student_url(&form.original_student_id)))
        }
        other => {
            let subject = format!("Student '{}'", form.original_student_id.trim());
            flash_outcome(&session, &other, &subject, "updated");
            Ok(redirect(&student_url(&form.original_student_id)))
        }
    }
}

pub async fn toggle_flag(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<FlagForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let flag = !form.current_flag.trim().eq_ignore_ascii_case(YES);
    let outcome = student::update_flag(&app.students, &form.student_id, flag).await?;
    let done = if flag { "flagged for follow-up" } else { "unflagged" };
    let subject = format!("Student '{}'", form.student_id.trim());
    flash_outcome(&session, &outcome, &subject, done);
    Ok(redirect(&student_url(&form.student_id)))
}

/// Checkbox form: `student_id`, `csrf_token` and one `documents` pair per ticked box.
pub async fn update_documents(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let field = |name: &str| {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    };
    csrf::validate_csrf(&session, field("csrf_token"))?;
    let student_id = field("student_id");

    let verified: Vec<Document> = form
        .iter()
        .filter(|(k, _)| k == "documents")
        .filter_map(|(_, v)| Document::from_key(v))
        .collect();
    let outcome = student::update_verified_documents(&app.students, student_id, &verified).await?;
    flash_outcome(&session, &outcome, "Document checklist", "saved");
    Ok(redirect(&student_url(student_id)))
}

pub async fn delete(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<StudentIdForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = student::delete(&app.students, &caller, &form.student_id).await?;
    let subject = format!("Student '{}'", form.student_id.trim());
    flash_outcome(&session, &outcome, &subject, "deleted");
    if outcome.is_success() {
        return Ok(redirect("/students"));
    }
    Ok(redirect(&student_url(&form.student_id)))
}

/// Manually flagged students plus everyone idle past the stuck threshold.
pub async fn flagged(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/flagged").await?;
    let at = now();
    let students = student::list_all(&app.students).await;
    let tmpl = FlaggedTemplate {
        ctx,
        flagged: StudentRow::build_all(student::flagged(&students), at),
        stuck: StudentRow::build_all(student::detect_stuck(&students, app.stuck_threshold, at), at),
        threshold_minutes: app.stuck_threshold.num_minutes(),
    };
    render(tmpl)
}

pub async fn lhc_queue(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/lhc_queue").await?;
    let students = student::list_all(&app.students).await;
    let tmpl = LhcQueueTemplate {
        ctx,
        students: StudentRow::build_all(student::lhc_queue(&students), now()),
    };
    render(tmpl)
}

pub async fn lhc_mark_done(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<StudentIdForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = student::advance_stage(
        &app.students,
        &form.student_id,
        Stage::LhcDocs,
        StageAction::MarkDone,
        &caller.display_name(),
        now(),
    )
    .await?;
    let subject = format!("LHC documents for '{}'", form.student_id.trim());
    flash_outcome(&session, &outcome, &subject, "marked done");
    Ok(redirect("/lhc_queue"))
}
