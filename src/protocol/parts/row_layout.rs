use crate::{protocol::msgp::BufferIn, RsqlResult};
use std::collections::HashMap;

/// The column names of a rowset, with a lookup table for access by name.
///
/// Names are normalized to lowercase. Unnamed columns can only be accessed
/// by position; the same holds for ambiguous names (a name that occurs more
/// than once is removed from the lookup table).
#[derive(Debug)]
pub(crate) struct RowLayout {
    colnames: Vec<String>,
    colname_map: HashMap<String, usize>,
}

impl RowLayout {
    pub(crate) fn parse<R: std::io::Read>(buffin: &mut BufferIn<R>) -> RsqlResult<Self> {
        let count = buffin.read_array_header()?;
        let mut colnames = Vec::with_capacity(count);
        for _ in 0..count {
            colnames.push(buffin.read_string()?.to_lowercase());
        }

        let mut colname_map = HashMap::with_capacity(count);
        for (i, name) in colnames.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            if colname_map.contains_key(name) {
                // ambiguous column name
                colname_map.remove(name);
            } else {
                colname_map.insert(name.clone(), i);
            }
        }

        Ok(Self {
            colnames,
            colname_map,
        })
    }

    pub(crate) fn colnames(&self) -> &[String] {
        &self.colnames
    }

    pub(crate) fn ordinal(&self, name: &str) -> Option<usize> {
        self.colname_map.get(&name.to_lowercase()).copied()
    }
}
