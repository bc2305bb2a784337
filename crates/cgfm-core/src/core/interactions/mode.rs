use crate::core::io::ParseErrorKind;
use phf::{Map, phf_map};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeToken {
    Fit,
    SymmetricFit,
    Table,
    SymmetricTable,
}

impl ModeToken {
    fn is_fit(self) -> bool {
        matches!(self, ModeToken::Fit | ModeToken::SymmetricFit)
    }
}

static MODE_TOKENS: Map<&'static str, ModeToken> = phf_map! {
    "fm" => ModeToken::Fit,
    "sym" => ModeToken::SymmetricFit,
    "tab" => ModeToken::Table,
    "tabsym" => ModeToken::SymmetricTable,
};

/// The roles a mode token assigns to one interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeRoles {
    pub matched: bool,
    pub symmetric: bool,
    pub tabulated: bool,
    pub symtab: bool,
}

impl ModeRoles {
    pub fn is_empty(&self) -> bool {
        !(self.matched || self.tabulated)
    }

    fn add(&mut self, token: ModeToken) {
        match token {
            ModeToken::Fit => self.matched = true,
            ModeToken::SymmetricFit => {
                self.matched = true;
                self.symmetric = true;
            }
            ModeToken::Table => self.tabulated = true,
            ModeToken::SymmetricTable => {
                self.tabulated = true;
                self.symtab = true;
            }
        }
    }
}

/// Resolves a mode string such as `fm+tab` into the roles it grants.
///
/// A mode is `none` or one or two `+`-joined parts, at most one fitting part
/// (`fm`, `sym`) and at most one tabulation part (`tab`, `tabsym`), in either
/// order. The legacy token `symtab` is accepted and grants nothing.
pub fn resolve_mode(mode: &str) -> Result<ModeRoles, ParseErrorKind> {
    match mode {
        "none" => return Ok(ModeRoles::default()),
        "symtab" => {
            debug!(mode, "Mode grants no role");
            return Ok(ModeRoles::default());
        }
        _ => {}
    }

    let unrecognized = || ParseErrorKind::UnrecognizedMode {
        mode: mode.to_string(),
    };

    let tokens = mode
        .split('+')
        .map(|part| MODE_TOKENS.get(part).copied())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(unrecognized)?;

    let fits = tokens.iter().filter(|t| t.is_fit()).count();
    let tables = tokens.len() - fits;
    if tokens.len() > 2 || fits > 1 || tables > 1 {
        return Err(unrecognized());
    }

    let mut roles = ModeRoles::default();
    for token in tokens {
        roles.add(token);
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_mode_handles_single_tokens() {
        assert_eq!(resolve_mode("none").unwrap(), ModeRoles::default());
        assert_eq!(
            resolve_mode("fm").unwrap(),
            ModeRoles {
                matched: true,
                ..Default::default()
            }
        );
        assert_eq!(
            resolve_mode("tabsym").unwrap(),
            ModeRoles {
                tabulated: true,
                symtab: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn resolve_mode_is_order_insensitive() {
        for (a, b) in [
            ("fm+tab", "tab+fm"),
            ("sym+tab", "tab+sym"),
            ("fm+tabsym", "tabsym+fm"),
            ("sym+tabsym", "tabsym+sym"),
        ] {
            assert_eq!(resolve_mode(a).unwrap(), resolve_mode(b).unwrap());
        }
    }

    #[test]
    fn sym_plus_tab_grants_matched_symmetric_and_tabulated() {
        let roles = resolve_mode("sym+tab").unwrap();
        assert!(roles.matched);
        assert!(roles.symmetric);
        assert!(roles.tabulated);
        assert!(!roles.symtab);
    }

    #[test]
    fn symtab_is_accepted_but_inert() {
        let roles = resolve_mode("symtab").unwrap();
        assert!(roles.is_empty());
    }

    #[test]
    fn resolve_mode_rejects_unknown_and_conflicting_tokens() {
        for mode in ["", "fit", "fm+sym", "tab+tabsym", "fm+tab+sym", "FM", "fm+"] {
            assert!(
                matches!(resolve_mode(mode), Err(ParseErrorKind::UnrecognizedMode { .. })),
                "mode {mode:?} should be rejected"
            );
        }
    }
}
