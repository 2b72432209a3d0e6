//! HTTP adapters for the mail API and the SMS provider.
//!
//! Delivery is best-effort relative to the stored code: every failure here
//! is soft and surfaces to the caller as `delivered = false`.

use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use crate::config::AuthConfig;
use crate::domain::repository::DeliveryGateway;
use crate::domain::types::DeliveryMethod;

#[derive(Clone)]
struct MailSettings {
    api_url: String,
    api_token: String,
    from: String,
}

#[derive(Clone)]
struct SmsSettings {
    api_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

/// One shared client for both transports. Missing credentials degrade to a
/// delivery error at send time instead of refusing to boot.
#[derive(Clone)]
pub struct HttpDeliveryGateway {
    http: reqwest::Client,
    mail: Option<MailSettings>,
    sms: Option<SmsSettings>,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

impl HttpDeliveryGateway {
    pub fn from_config(config: &AuthConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("build delivery http client");

        let mail = match (&config.mail_api_url, &config.mail_api_token, &config.mail_from) {
            (Some(api_url), Some(api_token), Some(from)) => Some(MailSettings {
                api_url: api_url.clone(),
                api_token: api_token.clone(),
                from: from.clone(),
            }),
            _ => None,
        };
        let sms = match (
            &config.sms_api_url,
            &config.sms_account_sid,
            &config.sms_auth_token,
            &config.sms_from,
        ) {
            (Some(api_url), Some(account_sid), Some(auth_token), Some(from)) => {
                Some(SmsSettings {
                    api_url: api_url.clone(),
                    account_sid: account_sid.clone(),
                    auth_token: auth_token.clone(),
                    from: from.clone(),
                })
            }
            _ => None,
        };

        Self { http, mail, sms }
    }

    async fn send_email(&self, to: &str, name: &str, code: &str) -> anyhow::Result<()> {
        let mail = self.mail.as_ref().context("mail delivery not configured")?;
        let url = format!("{}/email", mail.api_url);
        let body = SendEmailRequest {
            from: &mail.from,
            to,
            subject: "Your password reset code",
            text: format!(
                "Hi {name},\n\nYour password reset code is {code}. \
                 It expires in 15 minutes.\n\nIf you did not request a reset, \
                 ignore this message."
            ),
        };
        self.http
            .post(&url)
            .bearer_auth(&mail.api_token)
            .json(&body)
            .send()
            .await
            .context("send email request")?
            .error_for_status()
            .context("mail API rejected the message")?;
        Ok(())
    }

    async fn send_sms(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let sms = self.sms.as_ref().context("sms delivery not configured")?;
        let body = format!("Your password reset code is {code}. It expires in 15 minutes.");
        let params = [("To", to), ("From", sms.from.as_str()), ("Body", body.as_str())];
        self.http
            .post(&sms.api_url)
            .basic_auth(&sms.account_sid, Some(&sms.auth_token))
            .form(&params)
            .send()
            .await
            .context("send sms request")?
            .error_for_status()
            .context("sms provider rejected the message")?;
        Ok(())
    }
}

impl DeliveryGateway for HttpDeliveryGateway {
    async fn deliver_code(
        &self,
        to: &str,
        recipient_name: &str,
        code: &str,
        method: DeliveryMethod,
    ) -> anyhow::Result<()> {
        match method {
            DeliveryMethod::Email => self.send_email(to, recipient_name, code).await,
            DeliveryMethod::Sms => self.send_sms(to, code).await,
        }
    }
}
