use super::kind::TupleSymmetry;
use tracing::warn;

/// 1-based index into a type space; [`UNKNOWN_TYPE`] marks an unresolved token.
pub type TypeIndex = i32;

pub const UNKNOWN_TYPE: TypeIndex = -1;

/// Resolves a type token to its 1-based index.
///
/// Names are tried first, then a leading-digit numeric id. Anything else yields
/// [`UNKNOWN_TYPE`] and is reported.
pub fn match_type(token: &str, names: &[String]) -> TypeIndex {
    if let Some(position) = names.iter().position(|name| name == token) {
        return position as TypeIndex + 1;
    }

    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if let Ok(id) = digits.parse::<TypeIndex>() {
        if id >= 1 && (id as usize) <= names.len() {
            return id;
        }
    }

    warn!(token, "Unrecognized type");
    UNKNOWN_TYPE
}

/// Mixed-radix encoder over canonical type tuples of one interaction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleHasher {
    symmetry: TupleSymmetry,
    n_body: usize,
    n_types: usize,
}

impl TupleHasher {
    pub fn new(symmetry: TupleSymmetry, n_body: usize, n_types: usize) -> Self {
        Self {
            symmetry,
            n_body,
            n_types,
        }
    }

    pub fn n_body(&self) -> usize {
        self.n_body
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    /// Brings a tuple given in natural (file) order into canonical storage order.
    ///
    /// Vertex tuples `(a, v, b)` are stored as `[v, min(a, b), max(a, b)]`.
    pub fn canonicalize(&self, natural: &[TypeIndex]) -> Vec<TypeIndex> {
        match self.symmetry {
            TupleSymmetry::Single | TupleSymmetry::Ordered => natural.to_vec(),
            TupleSymmetry::Reversal => {
                let reversed: Vec<TypeIndex> = natural.iter().rev().copied().collect();
                if reversed.as_slice() < natural {
                    reversed
                } else {
                    natural.to_vec()
                }
            }
            TupleSymmetry::Vertex => {
                let (a, v, b) = (natural[0], natural[1], natural[2]);
                vec![v, a.min(b), a.max(b)]
            }
        }
    }

    /// Inverse of the storage reordering: vertex tuples come back as `[lo, v, hi]`.
    pub fn to_natural(&self, canonical: &[TypeIndex]) -> Vec<TypeIndex> {
        match self.symmetry {
            TupleSymmetry::Vertex => vec![canonical[1], canonical[0], canonical[2]],
            _ => canonical.to_vec(),
        }
    }

    fn is_canonical(&self, canonical: &[TypeIndex]) -> bool {
        self.canonicalize(&self.to_natural(canonical)) == canonical
    }

    /// Hash of an already canonical tuple.
    pub fn encode_canonical(&self, canonical: &[TypeIndex]) -> i64 {
        let radix = self.n_types as i64;
        canonical
            .iter()
            .fold(0_i64, |acc, &t| acc * radix + (t as i64 - 1))
    }

    /// Canonicalizes a natural-order tuple and hashes it.
    pub fn encode(&self, natural: &[TypeIndex]) -> i64 {
        self.encode_canonical(&self.canonicalize(natural))
    }

    /// Recovers the canonical tuple behind a hash produced by [`Self::encode`].
    pub fn decode(&self, hash: i64) -> Vec<TypeIndex> {
        let radix = self.n_types.max(1) as i64;
        let mut remaining = hash;
        let mut tuple = vec![0; self.n_body];
        for slot in tuple.iter_mut().rev() {
            *slot = (remaining % radix) as TypeIndex + 1;
            remaining /= radix;
        }
        tuple
    }

    /// Hashes of every canonical tuple in ascending order.
    pub fn enumerate_canonical(&self) -> Vec<i64> {
        if self.n_types == 0 {
            return Vec::new();
        }
        let space = (self.n_types as i64).pow(self.n_body as u32);
        (0..space)
            .filter(|&hash| self.is_canonical(&self.decode(hash)))
            .collect()
    }
}

/// Dense "index among defined" numbering over a class's canonical tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinedSet {
    hashes: Vec<i64>,
}

impl DefinedSet {
    /// Every canonical tuple the hasher can express.
    pub fn complete(hasher: &TupleHasher) -> Self {
        Self {
            hashes: hasher.enumerate_canonical(),
        }
    }

    /// Only the listed natural-order tuples, canonicalized and de-duplicated.
    pub fn from_tuples(hasher: &TupleHasher, tuples: &[Vec<TypeIndex>]) -> Self {
        let mut hashes: Vec<i64> = tuples.iter().map(|t| hasher.encode(t)).collect();
        hashes.sort_unstable();
        hashes.dedup();
        Self { hashes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn index_of(&self, hash: i64) -> Option<usize> {
        self.hashes.binary_search(&hash).ok()
    }

    pub fn hash_of(&self, index: usize) -> Option<i64> {
        self.hashes.get(index).copied()
    }
}
