use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use proc_macro2::TokenStream;
use syn::{meta::ParseNestedMeta, parenthesized, Attribute, LitStr, Result, Token};

macro_rules! syn_err {
    ($s:expr; $l:literal $(, $a:expr)*) => {
        return Err(syn::Error::new($s, format!($l $(, $a)*)))
    };
}

#[derive(Debug, Clone, Copy)]
pub enum Inflection {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl Inflection {
    fn parse(lit: &LitStr) -> Result<Self> {
        Ok(match &*lit.value() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => syn_err!(lit.span(); "unknown rename rule `{}`", other),
        })
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::ScreamingKebab => name.to_shouty_kebab_case(),
        }
    }
}

#[derive(Default)]
pub struct ContainerAttr {
    pub rename: Option<String>,
    pub rename_all: Option<Inflection>,
}

impl ContainerAttr {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in serde_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(parse_rename(&meta)?);
                } else if meta.path.is_ident("rename_all") {
                    out.rename_all = Some(Inflection::parse(&parse_rename_lit(&meta)?)?);
                } else {
                    ignore(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
pub struct FieldAttr {
    pub rename: Option<String>,
    pub skip: bool,
}

impl FieldAttr {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in serde_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(parse_rename(&meta)?);
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    out.skip = true;
                } else if meta.path.is_ident("flatten") {
                    return Err(meta.error("`Describe` does not support flattened fields"));
                } else {
                    ignore(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}

/// `rename = "..."` or `rename(serialize = "...")`, the serialized name is what clients see.
fn parse_rename(meta: &ParseNestedMeta) -> Result<String> {
    parse_rename_lit(meta).map(|lit| lit.value())
}

fn parse_rename_lit(meta: &ParseNestedMeta) -> Result<LitStr> {
    if meta.input.peek(Token![=]) {
        return meta.value()?.parse();
    }

    let mut serialize = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("serialize") {
            serialize = Some(nested.value()?.parse::<LitStr>()?);
        } else {
            ignore(&nested)?;
        }
        Ok(())
    })?;
    serialize.ok_or_else(|| meta.error("expected `serialize = \"...\"`"))
}

fn ignore(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<TokenStream>()?;
    }
    Ok(())
}
