//! Login and signup forms.

use crate::models::{LoginRequest, SignupRequest};

pub const NETWORK_ERROR: &str = "A network error occurred. Please try again.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub secret: bool,
}

/// A fixed set of text inputs with one focused field and an inline error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form<const N: usize> {
    specs: [FieldSpec; N],
    values: [String; N],
    focus: usize,
    pub error: Option<String>,
}

impl<const N: usize> Form<N> {
    pub fn new(specs: [FieldSpec; N]) -> Self {
        Self {
            specs,
            values: std::array::from_fn(|_| String::new()),
            focus: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &str, bool)> {
        self.specs
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .map(move |(i, (spec, value))| (spec, value.as_str(), i == self.focus))
    }

    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % N;
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + N - 1) % N;
    }

    pub fn push(&mut self, ch: char) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.push(ch);
        }
    }

    pub fn pop(&mut self) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.pop();
        }
    }

    pub fn reset(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.focus = 0;
        self.error = None;
    }
}

// ─── Login ───────────────────────────────────────────────────────────────────

pub type LoginForm = Form<2>;

pub fn login_form() -> LoginForm {
    Form::new([
        FieldSpec { label: "Email", secret: false },
        FieldSpec { label: "Password", secret: true },
    ])
}

impl Form<2> {
    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.value(0).trim().to_string(),
            password: self.value(1).to_string(),
        }
    }
}

// ─── Signup ──────────────────────────────────────────────────────────────────

pub type SignupForm = Form<4>;

pub fn signup_form() -> SignupForm {
    Form::new([
        FieldSpec { label: "Full Name", secret: false },
        FieldSpec { label: "Email", secret: false },
        FieldSpec { label: "Password", secret: true },
        FieldSpec { label: "Confirm Password", secret: true },
    ])
}

impl Form<4> {
    /// Checked locally before anything is sent.
    pub fn signup_request(&self) -> Result<SignupRequest, &'static str> {
        if self.value(2) != self.value(3) {
            return Err(PASSWORD_MISMATCH);
        }
        Ok(SignupRequest {
            fullname: self.value(0).trim().to_string(),
            email: self.value(1).trim().to_string(),
            password: self.value(2).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str<const N: usize>(form: &mut Form<N>, text: &str) {
        text.chars().for_each(|c| form.push(c));
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = login_form();
        form.focus_prev();
        assert_eq!(form.focus, 1);
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn login_trims_email_but_not_password() {
        let mut form = login_form();
        type_str(&mut form, " jane@uni.edu ");
        form.focus_next();
        type_str(&mut form, " pw ");
        let req = form.login_request();
        assert_eq!(req.email, "jane@uni.edu");
        assert_eq!(req.password, " pw ");
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let mut form = signup_form();
        type_str(&mut form, "Jane Roe");
        form.focus_next();
        type_str(&mut form, "jane@uni.edu");
        form.focus_next();
        type_str(&mut form, "secret1");
        form.focus_next();
        type_str(&mut form, "secret2");
        assert_eq!(form.signup_request().unwrap_err(), PASSWORD_MISMATCH);

        form.pop();
        form.push('1');
        let req = form.signup_request().unwrap();
        assert_eq!(req.fullname, "Jane Roe");
        assert_eq!(req.password, "secret1");
    }

    #[test]
    fn reset_clears_values_and_error() {
        let mut form = login_form();
        type_str(&mut form, "x");
        form.error = Some("bad".into());
        form.reset();
        assert_eq!(form.value(0), "");
        assert!(form.error.is_none());
        assert!(form.fields().next().unwrap().2);
    }
}
