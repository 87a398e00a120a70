#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street  : Option<String>,
    pub city    : Option<String>,
    pub state   : Option<String>,
    pub zip     : Option<String>,
    pub country : Option<String>,
}

fn is_blank(component: &Option<String>) -> bool {
    component.as_deref().map(str::trim).is_none_or(str::is_empty)
}

impl Address {
    /// An address is empty if none of its components carries any text.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.street)
            && is_blank(&self.city)
            && is_blank(&self.state)
            && is_blank(&self.zip)
            && is_blank(&self.country)
    }
}
