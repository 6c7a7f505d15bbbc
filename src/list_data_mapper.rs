use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    config::ListConfig,
    domain::{ListMember, EMAIL_FIELD},
    hooks::MergeVars,
};

const INTERESTS_FIELD: &str = "INTERESTS";

/// Merge fields and interest ids a list accepts.
#[derive(Clone, Debug, Default)]
struct ListFields {
    merge_fields: HashSet<String>,
    interests: HashSet<String>,
}

/// Projects submitted data onto each target list's own fields.
///
/// Lists without a field definition receive every submitted field.
#[derive(Clone, Debug, Default)]
pub struct ListDataMapper {
    lists: HashMap<String, ListFields>,
}

impl ListDataMapper {
    pub fn new(lists: &[ListConfig]) -> Self {
        let lists = lists
            .iter()
            .map(|list| {
                let fields = ListFields {
                    merge_fields: list.merge_fields.iter().map(|f| f.to_uppercase()).collect(),
                    interests: list.interests.iter().cloned().collect(),
                };
                (list.id.clone(), fields)
            })
            .collect();

        Self { lists }
    }

    /// One member per list id, in the order the ids were given.
    pub fn map(&self, data: &MergeVars, list_ids: &[String]) -> Vec<(String, ListMember)> {
        list_ids
            .iter()
            .map(|list_id| (list_id.clone(), self.map_list(data, list_id)))
            .collect()
    }

    fn map_list(&self, data: &MergeVars, list_id: &str) -> ListMember {
        let fields = self.lists.get(list_id);

        let merge_fields: BTreeMap<String, String> = data
            .iter()
            .filter(|(key, _)| key.as_str() != EMAIL_FIELD && key.as_str() != INTERESTS_FIELD)
            .filter(|(key, _)| fields.map_or(true, |f| f.merge_fields.contains(key.as_str())))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let interests: BTreeMap<String, bool> = data
            .get(INTERESTS_FIELD)
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .filter(|id| fields.map_or(true, |f| f.interests.contains(*id)))
                    .map(|id| (id.to_owned(), true))
                    .collect()
            })
            .unwrap_or_default();

        ListMember {
            email_address: data.get(EMAIL_FIELD).cloned().unwrap_or_default(),
            merge_fields,
            interests,
            ..Default::default()
        }
    }
}
