use http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOp {
    Set(HeaderName, HeaderValue),
    Remove(HeaderName),
}

impl HeaderOp {
    pub fn name(&self) -> &HeaderName {
        match self {
            HeaderOp::Set(name, _) | HeaderOp::Remove(name) => name,
        }
    }

    /// `insert` replaces every existing value, so applying twice never duplicates.
    pub fn apply(&self, headers: &mut HeaderMap) {
        match self {
            HeaderOp::Set(name, value) => {
                headers.insert(name.clone(), value.clone());
            }
            HeaderOp::Remove(name) => {
                headers.remove(name);
            }
        }
    }
}

/// Header operations for one transport, each header name at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedHeaderSet {
    ops: Vec<HeaderOp>,
}

impl ResolvedHeaderSet {
    /// Later operations on a name replace earlier ones.
    pub fn push(&mut self, op: HeaderOp) {
        self.ops.retain(|existing| existing.name() != op.name());
        self.ops.push(op);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderOp> { self.ops.iter() }

    /// Only the headers that are set, in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.ops.iter().filter_map(|op| match op {
            HeaderOp::Set(name, value) => Some((name, value)),
            HeaderOp::Remove(_) => None,
        })
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.pairs().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize { self.ops.len() }

    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for op in &self.ops {
            op.apply(headers);
        }
    }
}
