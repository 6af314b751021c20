//! Account operations: sign-in, registration, OTP and password flows.

use tracing::{info, instrument, warn};

use vendorflow_core::types::endpoint;
use vendorflow_core::{
    AuthResponse, LoginCredentials, MessageResponse, OtpPurpose, OtpSent, RegisterData, Result,
    User,
};

use crate::client::{ApiClient, RequestOptions};
use crate::endpoints::{
    ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest, SendOtpRequest,
    VerifyOtpRequest,
};

impl ApiClient {
    /// Sign in with email and password and store the returned session.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let auth = self
            .authenticate(endpoint::LOGIN, RequestOptions::post().json(credentials)?)
            .await?;
        if auth.token().is_some() {
            info!("Logged in");
        }
        Ok(auth)
    }

    /// Create an account. A response carrying a token signs the user in.
    #[instrument(skip(self, data), fields(email = %data.email, role = %data.role))]
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        let auth = self
            .authenticate(endpoint::REGISTER, RequestOptions::post().json(data)?)
            .await?;
        info!("Registered account");
        Ok(auth)
    }

    /// Ask the server to email a one-time password.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &str, purpose: OtpPurpose) -> Result<OtpSent> {
        let body = SendOtpRequest { email, purpose };
        self.request(endpoint::SEND_OTP, RequestOptions::post().json(&body)?)
            .await?
            .into_json()
    }

    /// Exchange a one-time password for a session.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        purpose: OtpPurpose,
    ) -> Result<AuthResponse> {
        let body = VerifyOtpRequest {
            email,
            otp,
            purpose,
        };
        let auth = self
            .authenticate(endpoint::VERIFY_OTP, RequestOptions::post().json(&body)?)
            .await?;
        info!("Verified one-time password");
        Ok(auth)
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let body = ForgotPasswordRequest { email };
        self.request(endpoint::FORGOT_PASSWORD, RequestOptions::post().json(&body)?)
            .await?
            .into_json()
    }

    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        let body = ResetPasswordRequest {
            token,
            new_password,
        };
        self.request(endpoint::RESET_PASSWORD, RequestOptions::post().json(&body)?)
            .await?
            .into_json()
    }

    /// Change the signed-in user's password. A protected call.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let body = ChangePasswordRequest {
            current_password,
            new_password,
        };
        self.request(endpoint::CHANGE_PASSWORD, RequestOptions::post().json(&body)?)
            .await?
            .into_json()
    }

    /// End the session on the server and locally.
    ///
    /// The local credential and profile are cleared whatever the server
    /// answers. Without a credential no request is sent.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let result = if self.credentials().current().is_some() {
            self.request(endpoint::LOGOUT, RequestOptions::post())
                .await
                .map(|_| ())
        } else {
            Ok(())
        };

        if let Err(ref e) = result {
            warn!(error = %e, "Logout request failed, clearing session anyway");
        }
        self.credentials().clear();
        info!("Logged out");
        result
    }

    /// The profile stored at the last sign-in.
    pub fn current_user(&self) -> Option<User> {
        self.credentials().user()
    }

    /// True while a token is held and is not within the expiry skew.
    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_authenticated()
    }

    /// Send a credential-establishing call. The session is stored only when
    /// the response carries a token; an OTP step returns it untouched.
    async fn authenticate(&self, endpoint: &str, options: RequestOptions) -> Result<AuthResponse> {
        let auth: AuthResponse = self.request(endpoint, options).await?.into_json()?;
        if auth.token().is_some() {
            self.credentials().store_auth(&auth)?;
        } else if auth.requires_otp {
            info!("One-time password required to finish");
        }
        Ok(auth)
    }
}
