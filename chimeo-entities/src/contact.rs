#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    /// The public homepage of an organization
    pub website: Option<String>,

    /// A phone number to get in contact
    pub phone: Option<String>,

    /// An e-mail address to get in contact
    pub email: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.website.is_none() && self.phone.is_none() && self.email.is_none()
    }
}
