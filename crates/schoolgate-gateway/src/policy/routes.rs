//! Public/protected path classification.

/// Classification result for a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Bypasses identity and role checks; receives security headers only.
    Public,
    /// Goes through the full authorization pipeline.
    Protected,
}

#[derive(Debug, Clone)]
pub struct RouteClassifier {
    public: Vec<String>,
    protected: Vec<String>,
}

impl RouteClassifier {
    pub fn new(public: &[String], protected: &[String]) -> Self {
        Self {
            public: public.to_vec(),
            protected: protected.to_vec(),
        }
    }

    /// Longest matching prefix across both lists decides.
    /// A path matching neither list is public.
    pub fn classify(&self, path: &str) -> RouteClass {
        let longest = |prefixes: &[String]| {
            prefixes
                .iter()
                .filter(|p| path.starts_with(p.as_str()))
                .map(String::len)
                .max()
        };

        match (longest(&self.public), longest(&self.protected)) {
            (_, None) => RouteClass::Public,
            (None, Some(_)) => RouteClass::Protected,
            (Some(pub_len), Some(prot_len)) if pub_len >= prot_len => RouteClass::Public,
            (Some(_), Some(_)) => RouteClass::Protected,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.classify(path) == RouteClass::Public
    }
}
