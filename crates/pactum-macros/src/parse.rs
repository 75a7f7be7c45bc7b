//! Attribute parsing for `#[derive(Contract)]`.
//!
//! Reads `#[contract(...)]` attributes and the subset of `#[serde(...)]`
//! that changes wire names (`rename`, `rename_all`, `skip`).

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Field, Lit, LitStr, Meta, Variant, Visibility};

/// Transport location declared on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
    Header,
    Cookie,
    Form,
}

impl Source {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "form" => Some(Self::Form),
            _ => None,
        }
    }

    pub fn variant(self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Header => "Header",
            Self::Cookie => "Cookie",
            Self::Form => "Form",
        }
    }
}

/// serde `rename_all` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule: {other}"),
                ))
            }
        })
    }

    /// Renames a snake_case field identifier.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => field
                .split('_')
                .map(capitalize)
                .collect::<String>(),
            Self::Camel => {
                let pascal = Self::Pascal.apply_to_field(field);
                lowercase_first(&pascal)
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }

    /// Renames a PascalCase variant identifier.
    pub fn apply_to_variant(self, variant: &str) -> String {
        match self {
            Self::Pascal => variant.to_string(),
            Self::Lower => variant.to_ascii_lowercase(),
            Self::Upper => variant.to_ascii_uppercase(),
            Self::Camel => lowercase_first(variant),
            Self::Snake => snake_case(variant),
            Self::ScreamingSnake => snake_case(variant).to_ascii_uppercase(),
            Self::Kebab => snake_case(variant).replace('_', "-"),
            Self::ScreamingKebab => snake_case(variant).replace('_', "-").to_ascii_uppercase(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

fn snake_case(pascal: &str) -> String {
    let mut out = String::with_capacity(pascal.len() + 4);
    for (i, ch) in pascal.char_indices() {
        if ch.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Container-level attributes.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    pub name: Option<String>,
    pub inline: bool,
    pub schema_provider: bool,
    pub schema_transformer: bool,
    pub self_validate: bool,
    pub rename_all: Option<RenameRule>,
    pub doc: Option<String>,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self {
            doc: doc_comment(attrs),
            ..Self::default()
        };

        for attr in attrs {
            if attr.path().is_ident("contract") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        out.name = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("inline") {
                        out.inline = true;
                    } else if meta.path.is_ident("schema_provider") {
                        out.schema_provider = true;
                    } else if meta.path.is_ident("schema_transformer") {
                        out.schema_transformer = true;
                    } else if meta.path.is_ident("self_validate") {
                        out.self_validate = true;
                    } else if meta.path.is_ident("doc") {
                        out.doc = Some(string_value(&meta)?);
                    } else {
                        return Err(meta.error("unknown contract container attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        let lit: LitStr = meta.value()?.parse()?;
                        out.rename_all = Some(RenameRule::parse(&lit)?);
                    } else {
                        skip_meta(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        if out.inline && out.name.is_some() {
            return Err(syn::Error::new(
                Span::call_site(),
                "`inline` and `name` are mutually exclusive",
            ));
        }
        Ok(out)
    }
}

/// Field-level attributes.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub source: Option<(Source, String)>,
    pub raw: bool,
    pub required: bool,
    pub doc: Option<String>,
    pub default: Option<String>,
    pub example: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub enum_values: Vec<String>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub serde_rename: Option<String>,
    pub serde_skip: bool,
}

impl FieldAttrs {
    pub fn parse(field: &Field) -> syn::Result<Self> {
        let mut out = Self {
            doc: doc_comment(&field.attrs),
            ..Self::default()
        };

        for attr in &field.attrs {
            if attr.path().is_ident("contract") {
                attr.parse_nested_meta(|meta| out.parse_contract_key(&meta))?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if meta.input.peek(syn::Token![=]) {
                            out.serde_rename = Some(string_value(&meta)?);
                        } else {
                            skip_meta(&meta)?;
                        }
                    } else if meta.path.is_ident("skip")
                        || meta.path.is_ident("skip_serializing")
                        || meta.path.is_ident("skip_deserializing")
                    {
                        out.serde_skip = true;
                    } else {
                        skip_meta(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        if out.raw && out.source.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "a raw request field cannot also declare a binding source",
            ));
        }
        Ok(out)
    }

    fn parse_contract_key(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        let key = meta
            .path
            .get_ident()
            .map(|ident| ident.unraw().to_string())
            .ok_or_else(|| meta.error("expected identifier"))?;

        if let Some(source) = Source::from_key(&key) {
            if self.source.is_some() {
                return Err(meta.error("a field can have at most one binding source"));
            }
            self.source = Some((source, string_value(meta)?));
            return Ok(());
        }

        match key.as_str() {
            "raw" => self.raw = true,
            "required" => self.required = true,
            "doc" => self.doc = Some(string_value(meta)?),
            "default" => self.default = Some(string_value(meta)?),
            "example" => self.example = Some(string_value(meta)?),
            "pattern" => self.pattern = Some(string_value(meta)?),
            "min_length" => self.min_length = Some(int_value(meta)?),
            "max_length" => self.max_length = Some(int_value(meta)?),
            "min_items" => self.min_items = Some(int_value(meta)?),
            "max_items" => self.max_items = Some(int_value(meta)?),
            "minimum" => self.minimum = Some(float_value(meta)?),
            "maximum" => self.maximum = Some(float_value(meta)?),
            "enum_values" => {
                self.enum_values = string_value(meta)?
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
            }
            _ => return Err(meta.error(format!("unknown contract field attribute `{key}`"))),
        }
        Ok(())
    }
}

/// Returns `true` if the field is visible outside its module.
pub fn is_exported(field: &Field) -> bool {
    matches!(field.vis, Visibility::Public(_))
}

/// serde rename of an enum variant, if any.
pub fn variant_rename(variant: &Variant) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in &variant.attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    rename = Some(string_value(&meta)?);
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
    }
    Ok(rename)
}

/// Joins `///` comments into one trimmed string.
pub fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    let joined = lines.join("\n").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn int_value(meta: &ParseNestedMeta<'_>) -> syn::Result<usize> {
    match meta.value()?.parse::<Lit>()? {
        Lit::Int(lit) => lit.base10_parse(),
        Lit::Str(lit) => lit
            .value()
            .trim()
            .parse()
            .map_err(|_| syn::Error::new(lit.span(), "expected a non-negative integer")),
        other => Err(syn::Error::new(other.span(), "expected a non-negative integer")),
    }
}

fn float_value(meta: &ParseNestedMeta<'_>) -> syn::Result<f64> {
    let input = meta.value()?;
    let negative = input.peek(syn::Token![-]);
    if negative {
        input.parse::<syn::Token![-]>()?;
    }
    let value = match input.parse::<Lit>()? {
        Lit::Int(lit) => lit.base10_parse::<f64>()?,
        Lit::Float(lit) => lit.base10_parse::<f64>()?,
        Lit::Str(lit) => lit
            .value()
            .trim()
            .parse()
            .map_err(|_| syn::Error::new(lit.span(), "expected a number"))?,
        other => return Err(syn::Error::new(other.span(), "expected a number")),
    };
    Ok(if negative { -value } else { value })
}

// Consumes the value of a serde key this macro does not interpret.
fn skip_meta(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}
