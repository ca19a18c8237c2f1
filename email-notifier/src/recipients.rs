/// Split a comma separated recipient list, trimming whitespace and dropping
/// empty entries.
///
/// ```
/// use email_notifier::parse_recipient_list;
///
/// assert_eq!(
///     parse_recipient_list(" a@x.com, b@y.com ,"),
///     vec!["a@x.com".to_string(), "b@y.com".to_string()],
/// );
/// ```
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
