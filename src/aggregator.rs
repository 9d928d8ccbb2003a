use crate::types::{SenderGroup, SenderRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref BRACKETED_ADDRESS: Regex = Regex::new(r"<(.+?)>").unwrap();
}

/// Grouping key for a `From` header: the first `<...>` span when there is
/// one, otherwise the raw value.
pub fn extract_email(sender: &str) -> &str {
    BRACKETED_ADDRESS
        .captures(sender)
        .and_then(|caps| caps.get(1))
        .map_or(sender, |m| m.as_str())
}

/// Group records by sender address. Groups are ordered by message count,
/// largest first; equal counts keep the order in which the sender was
/// first seen.
pub fn aggregate<I>(records: I) -> Vec<SenderGroup>
where
    I: IntoIterator<Item = SenderRecord>,
{
    let mut groups: Vec<SenderGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for SenderRecord { sender, message } in records {
        let email = extract_email(&sender).to_string();
        let slot = match index.get(&email) {
            Some(&slot) => slot,
            None => {
                index.insert(email.clone(), groups.len());
                groups.push(SenderGroup {
                    display_label: sender,
                    email,
                    count: 0,
                    messages: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[slot];
        group.count += 1;
        group.messages.push(message);
    }

    // sort_by is stable, which keeps first-seen order among ties
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}
