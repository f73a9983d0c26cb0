//! Ingestion of ids and query terms.
//!
//! Callers may hand the batch engine a comma-joined string, a finite list,
//! or a lazy (possibly fallible) iterator. All of them are turned into one
//! lazy [`Terms`] sequence before chunking.

use std::fmt;

use crate::error::FerroError;

/// A lazy, fallible sequence of terms in input order.
pub type Terms<'a> = Box<dyn Iterator<Item = Result<String, FerroError>> + 'a>;

/// Ids or query terms accepted by batch operations.
pub enum QueryInput<'a> {
    /// A single string of comma-separated terms.
    ///
    /// Each term is trimmed and empty terms are dropped, so `"rs1, ,rs2 "`
    /// queries `rs1` and `rs2` only. Use [`QueryInput::List`] to send terms
    /// verbatim.
    Joined(String),
    /// A finite, ordered collection.
    List(Vec<String>),
    /// A lazy sequence, consumed batch by batch.
    Lazy(Terms<'a>),
}

impl<'a> QueryInput<'a> {
    /// Wrap an infallible iterator of terms.
    pub fn lazy<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<String>,
    {
        QueryInput::Lazy(Box::new(
            iter.into_iter().map(|s| Ok::<String, FerroError>(s.into())),
        ))
    }

    /// Wrap a fallible iterator, e.g. ids decoded from a VCF file.
    ///
    /// The first `Err` aborts the batch run that consumes it.
    pub fn fallible<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<String, FerroError>>,
        I::IntoIter: 'a,
    {
        QueryInput::Lazy(Box::new(iter.into_iter()))
    }

    /// Normalize into a single lazy sequence.
    ///
    /// Joined strings are split on commas; surrounding whitespace is trimmed
    /// and empty segments are dropped.
    pub fn into_terms(self) -> Terms<'a> {
        match self {
            QueryInput::Joined(joined) => {
                Box::new(split_terms(&joined).into_iter().map(Ok::<_, FerroError>))
            }
            QueryInput::List(list) => Box::new(list.into_iter().map(Ok::<_, FerroError>)),
            QueryInput::Lazy(terms) => terms,
        }
    }
}

/// Split a comma-joined string into trimmed, non-empty terms.
///
/// ```
/// use ferro_myvariant::batch::split_terms;
///
/// assert_eq!(split_terms(" rs1, ,rs2 ,"), vec!["rs1", "rs2"]);
/// ```
pub fn split_terms(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl fmt::Debug for QueryInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryInput::Joined(s) => f.debug_tuple("Joined").field(s).finish(),
            QueryInput::List(list) => f.debug_tuple("List").field(list).finish(),
            QueryInput::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for QueryInput<'_> {
    fn from(s: &str) -> Self {
        QueryInput::Joined(s.to_string())
    }
}

impl From<String> for QueryInput<'_> {
    fn from(s: String) -> Self {
        QueryInput::Joined(s)
    }
}

impl From<Vec<String>> for QueryInput<'_> {
    fn from(list: Vec<String>) -> Self {
        QueryInput::List(list)
    }
}

impl From<Vec<&str>> for QueryInput<'_> {
    fn from(list: Vec<&str>) -> Self {
        QueryInput::List(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for QueryInput<'_> {
    fn from(list: &[&str]) -> Self {
        QueryInput::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for QueryInput<'_> {
    fn from(list: [&str; N]) -> Self {
        QueryInput::List(list.iter().map(|s| s.to_string()).collect())
    }
}

/// A list of field names or scopes, given as a list or a comma-joined string.
///
/// ```
/// use ferro_myvariant::batch::FieldList;
///
/// assert_eq!(FieldList::from("cadd.phred, dbsnp").joined(), "cadd.phred,dbsnp");
/// assert_eq!(FieldList::from(vec!["cosmic", "clinvar"]).joined(), "cosmic,clinvar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldList(Vec<String>);

impl FieldList {
    /// Comma-joined form sent on the wire.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    /// Individual names.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// True if no names are listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for FieldList {
    fn from(s: &str) -> Self {
        FieldList(split_terms(s))
    }
}

impl From<String> for FieldList {
    fn from(s: String) -> Self {
        FieldList(split_terms(&s))
    }
}

impl From<Vec<String>> for FieldList {
    fn from(list: Vec<String>) -> Self {
        FieldList(list)
    }
}

impl From<Vec<&str>> for FieldList {
    fn from(list: Vec<&str>) -> Self {
        FieldList(list.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: QueryInput<'_>) -> Vec<String> {
        input
            .into_terms()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_joined_is_split_on_commas() {
        let terms = collect(QueryInput::from("rs58991260, rs2500,,rs1433078"));
        assert_eq!(terms, vec!["rs58991260", "rs2500", "rs1433078"]);
    }

    #[test]
    fn test_joined_terms_are_trimmed_but_lists_are_verbatim() {
        assert_eq!(split_terms(" rs1 ,\t,rs2\n"), vec!["rs1", "rs2"]);
        assert_eq!(split_terms(" , ,"), Vec::<String>::new());

        let terms = collect(QueryInput::from(vec![" rs1", ""]));
        assert_eq!(terms, vec![" rs1", ""]);
    }

    #[test]
    fn test_empty_joined_string_yields_nothing() {
        assert!(collect(QueryInput::from("")).is_empty());
    }

    #[test]
    fn test_list_keeps_order_and_duplicates() {
        let terms = collect(QueryInput::from(vec!["b", "a", "b"]));
        assert_eq!(terms, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_lazy_iterator() {
        let ids = (1..=3).map(|i| format!("chr1:g.{}A>G", i));
        let terms = collect(QueryInput::lazy(ids));
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[2], "chr1:g.3A>G");
    }

    #[test]
    fn test_fallible_iterator_surfaces_errors() {
        let items = vec![Ok("a".to_string()), Err(FerroError::malformed("bad line"))];
        let result: Result<Vec<_>, _> = QueryInput::fallible(items).into_terms().collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_all_forms_agree() {
        let ids = ["x", "y", "z"];
        let joined = collect(QueryInput::from(ids.join(",")));
        let list = collect(QueryInput::from(ids));
        let lazy = collect(QueryInput::lazy(ids.iter().copied()));
        assert_eq!(joined, list);
        assert_eq!(list, lazy);
    }

    #[test]
    fn test_field_list() {
        let fields = FieldList::from("dbnsfp,cadd,cosmic");
        assert_eq!(fields.names().len(), 3);
        assert_eq!(fields.joined(), "dbnsfp,cadd,cosmic");
        assert!(FieldList::default().is_empty());
    }
}
