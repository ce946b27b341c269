use crate::backend::User;

/// What the console knows about the signed-in user.
///
/// `Unloaded` and `Anonymous` are distinct: the first means the
/// session has not been asked for yet, the second that it was asked for and
/// there is none.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionContext {
    #[default]
    Unloaded,
    Anonymous,
    Authenticated(User),
}

impl SessionContext {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, SessionContext::Unloaded)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionContext::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionContext::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn establish(&mut self, user: User) {
        *self = SessionContext::Authenticated(user);
    }

    /// Forget the user after logout or an auth redirect
    pub fn reset(&mut self) {
        *self = SessionContext::Anonymous;
    }
}
