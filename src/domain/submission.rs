use std::collections::HashMap;

/// Hidden field every form carries to identify itself.
pub const FORM_ID_FIELD: &str = "_mc4wp_form_id";
/// Fields starting with this prefix are internal and never reach a list.
pub const INTERNAL_FIELD_PREFIX: &str = "_mc4wp_";

/// Read-only view of an inbound form submission.
#[derive(Clone, Debug, Default)]
pub struct SubmissionRequest {
    post: HashMap<String, String>,
    params: HashMap<String, String>,
    client_ip: String,
    is_async: bool,
}

impl SubmissionRequest {
    /// Builds a request from decoded body and query pairs.
    ///
    /// Repeated keys ending in `[]` are collapsed into one comma separated
    /// value under the bare key. Merged parameters prefer the body over the
    /// query string.
    pub fn new(
        post: Vec<(String, String)>,
        query: Vec<(String, String)>,
        client_ip: impl Into<String>,
        is_async: bool,
    ) -> Self {
        let post = collect_pairs(post);
        let mut params = collect_pairs(query);
        params.extend(post.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            post,
            params,
            client_ip: client_ip.into(),
            is_async,
        }
    }

    pub fn post(&self, key: &str) -> Option<&str> {
        self.post.get(key).map(String::as_str)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn post_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.post.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    /// Whether the submission came in through a background (AJAX) request.
    pub fn is_async(&self) -> bool {
        self.is_async
    }
}

fn collect_pairs(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    for (key, value) in pairs {
        match key.strip_suffix("[]") {
            Some(key) => {
                map.entry(key.to_owned())
                    .and_modify(|joined| {
                        joined.push(',');
                        joined.push_str(&value);
                    })
                    .or_insert(value);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    map
}
