use std::sync::OnceLock;

use tera::{Context, Tera};
use tracing::info;

use crate::web::types::ValidSignup;

const SIGNUP_NOTIFICATION: &str = "signup_notification.html";

/// Holds the email templates. They are compiled into the binary so the service
/// doesn't depend on the working directory it was started from.
#[derive(Debug)]
pub struct TemplateManager {
    tera: &'static Tera,
}

impl TemplateManager {
    pub fn init() -> Result<Self, tera::Error> {
        static TERA: OnceLock<Tera> = OnceLock::new();

        let tera = match TERA.get() {
            Some(tera) => tera,
            None => {
                info!(
                    "{:<20} - Initializing the Template manager",
                    "templ manager"
                );
                let mut tera = Tera::default();
                tera.add_raw_template(
                    SIGNUP_NOTIFICATION,
                    include_str!("../templates/signup_notification.html"),
                )?;
                TERA.get_or_init(|| tera)
            }
        };

        Ok(Self { tera })
    }

    /// Renders the operator notification for a new signup.
    /// User input is escaped since the template ends in `.html`.
    pub fn render_signup_notification(
        &self,
        signup: &ValidSignup,
        submitted_at: &str,
    ) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("name", signup.name.as_ref());
        ctx.insert("email", signup.email.as_ref());
        ctx.insert("submitted_at", submitted_at);

        self.tera.render(SIGNUP_NOTIFICATION, &ctx)
    }
}
