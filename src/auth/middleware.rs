use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};

use super::session;
use crate::context::AppContext;
use crate::models::user;

fn to_login<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
    let response = HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish();
    req.into_response(response).map_into_right_body()
}

/// Redirects to /login unless the session carries a logged-in user who is
/// still on the Volunteers worksheet. A changed role takes effect on the
/// next request.
pub async fn require_auth<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let session = req.get_session();
    let Some(username) = session::username(&session) else {
        return Ok(to_login(req));
    };

    if let Some(app) = req.app_data::<web::Data<AppContext>>() {
        match user::load_all(&app.users).await {
            Ok(users) => match users.into_iter().find(|u| u.username == username) {
                Some(u) => session::sync_role(&session, u.role),
                None => {
                    log::info!("Session for removed user '{username}' ended");
                    session.purge();
                    return Ok(to_login(req));
                }
            },
            // Keep the recorded role while the store is unreachable.
            Err(e) => log::warn!("Could not re-check user '{username}': {e}"),
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
