/// What a form does with a valid submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum FormAction {
    #[default]
    Subscribe,
    Unsubscribe,
}

impl FormAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormAction::Subscribe => "subscribe",
            FormAction::Unsubscribe => "unsubscribe",
        }
    }
}

impl TryFrom<String> for FormAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "subscribe" => Ok(Self::Subscribe),
            "unsubscribe" => Ok(Self::Unsubscribe),
            other => Err(format!(
                "`{other}` is not a supported form action. \
                Use either `subscribe` or `unsubscribe`."
            )),
        }
    }
}
