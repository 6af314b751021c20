//! Request bodies for the auth endpoints.

use serde::Serialize;

use vendorflow_core::OtpPurpose;

#[derive(Serialize)]
pub(crate) struct SendOtpRequest<'a> {
    pub email: &'a str,
    pub purpose: OtpPurpose,
}

#[derive(Serialize)]
pub(crate) struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub purpose: OtpPurpose,
}

#[derive(Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}
