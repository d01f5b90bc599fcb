// src/fixer/rules.rs

//! Rewrite rules for generated React Native code
//!
//! Each rule takes the whole file and returns the rewritten text. Rules
//! only look at text; a rule that finds nothing returns its input.

use super::imports;
use crate::convert::plan::screen_name_for_route;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// HTML tags rendered as `View`
pub const VIEW_TAGS: &[&str] = &[
    "div", "section", "article", "aside", "header", "footer", "main", "nav", "form", "ul", "ol",
    "li", "table", "thead", "tbody", "tr", "td", "th", "figure", "fieldset",
];

/// HTML tags rendered as `Text`
pub const TEXT_TAGS: &[&str] = &[
    "p", "span", "h1", "h2", "h3", "h4", "h5", "h6", "label", "strong", "em", "b", "i", "small",
    "blockquote", "code", "pre",
];

/// React Native components that must be imported from `react-native`
pub const RN_COMPONENTS: &[&str] = &[
    "View",
    "Text",
    "Image",
    "ImageBackground",
    "TouchableOpacity",
    "Pressable",
    "TextInput",
    "ScrollView",
    "FlatList",
    "SectionList",
    "SafeAreaView",
    "ActivityIndicator",
    "Switch",
    "Modal",
    "KeyboardAvoidingView",
    "RefreshControl",
];

/// React Native modules used as `Name.method(...)`
pub const RN_APIS: &[&str] = &[
    "StyleSheet",
    "Platform",
    "Alert",
    "Dimensions",
    "Linking",
    "Keyboard",
    "Animated",
];

pub const ASYNC_STORAGE_MODULE: &str = "@react-native-async-storage/async-storage";
pub const NAVIGATION_MODULE: &str = "@react-navigation/native";

/// React Native replacement for an HTML tag
pub fn rn_component_for(tag: &str) -> Option<&'static str> {
    if VIEW_TAGS.contains(&tag) {
        return Some("View");
    }
    if TEXT_TAGS.contains(&tag) {
        return Some("Text");
    }
    match tag {
        "img" => Some("Image"),
        "button" | "a" => Some("TouchableOpacity"),
        "input" | "textarea" => Some("TextInput"),
        _ => None,
    }
}

fn html_tag_alternation() -> String {
    VIEW_TAGS
        .iter()
        .chain(TEXT_TAGS)
        .chain(&["img", "button", "a", "input", "textarea"])
        .copied()
        .collect::<Vec<_>>()
        .join("|")
}

pub(crate) struct Patterns {
    pub html_open: Regex,
    pub html_close: Regex,
    pub line_break: Regex,
    pub rule: Regex,
    pub on_click: Regex,
    pub class_name_attr: Regex,
    pub class_name: Regex,
    pub directive: Regex,
    pub head_block: Regex,
    pub next_import: Regex,
    pub browser_global: Regex,
    pub local_storage: Regex,
    pub use_router: Regex,
    pub router_binding: Regex,
    pub router_push: Regex,
    pub router_back: Regex,
    pub route_params: Regex,
    pub route_name: Regex,
    pub navigate_path: Regex,
    pub navigation_used: Regex,
    pub navigation_declared: Regex,
    pub component_start: Regex,
    pub jsx_component: Regex,
    pub rn_api: Regex,
    pub local_declaration: Regex,
    pub href_attr: Regex,
    pub link_props: Regex,
    pub src_attr: Regex,
    pub alt_attr: Regex,
    pub image_only_props: Regex,
    pub size_attr: Regex,
    pub on_change: Regex,
    pub target_value: Regex,
    pub input_type: Regex,
}

pub(crate) static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| {
    let tags = html_tag_alternation();
    Patterns {
        html_open: Regex::new(&format!(r"<({tags})\b")).unwrap(),
        html_close: Regex::new(&format!(r"</({tags})\s*>")).unwrap(),
        line_break: Regex::new(r"<br\s*/?>").unwrap(),
        rule: Regex::new(r"<hr\s*/?>").unwrap(),
        on_click: Regex::new(r"\bonClick(\s*=)").unwrap(),
        class_name_attr: Regex::new(
            r#"\s+className\s*=\s*(?:"[^"]*"|'[^']*'|\{(?:[^{}]|\{[^{}]*\})*\})"#,
        )
        .unwrap(),
        class_name: Regex::new(r"\bclassName\s*=").unwrap(),
        directive: Regex::new(r#"(?m)^[ \t]*['"]use (?:client|server)['"][ \t]*;?[ \t]*\r?\n?"#).unwrap(),
        head_block: Regex::new(r"(?s)[ \t]*<Head>.*?</Head>[ \t]*\r?\n?").unwrap(),
        next_import: Regex::new(r#"(?m)^[ \t]*import\b[^;]*?from\s*['"](next(?:/[\w/.-]+)?)['"]"#).unwrap(),
        browser_global: Regex::new(
            r"\b(window|document|localStorage|sessionStorage)\s*[.\[]|\btypeof\s+(window|document)\b",
        )
        .unwrap(),
        local_storage: Regex::new(r"\blocalStorage\s*\.\s*(getItem|setItem|removeItem|clear)\s*\(").unwrap(),
        use_router: Regex::new(r"\buseRouter\s*\(\s*\)").unwrap(),
        router_binding: Regex::new(r"\b(const|let)\s+router\s*=\s*useNavigation\(\)").unwrap(),
        router_push: Regex::new(r"\brouter\.(?:push|replace)\s*\(").unwrap(),
        router_back: Regex::new(r"\brouter\.back\s*\(\s*\)").unwrap(),
        route_params: Regex::new(r"\brouter\.query\b|\buseSearchParams\s*\(\s*\)|\buseParams\s*\(\s*\)").unwrap(),
        route_name: Regex::new(r"\brouter\.pathname\b|\busePathname\s*\(\s*\)").unwrap(),
        navigate_path: Regex::new(r#"navigation\.navigate\(\s*['"](/[^'"]*)['"]"#).unwrap(),
        navigation_used: Regex::new(r"\bnavigation\s*\.").unwrap(),
        navigation_declared: Regex::new(r"\b(?:const|let|var)\s+navigation\b|[{,(]\s*navigation\s*[,})]").unwrap(),
        component_start: Regex::new(
            r"(?m)^(?:export\s+(?:default\s+)?)?(?:function\s+[A-Z][\w$]*\s*\([^)]*\)\s*(?::[^{]+)?|const\s+[A-Z][\w$]*\s*(?::[^=]+)?=\s*(?:\([^)]*\)|[\w$]+)\s*(?::[^=]+)?=>\s*)\{",
        )
        .unwrap(),
        jsx_component: Regex::new(r"<([A-Z][\w]*)\b").unwrap(),
        rn_api: Regex::new(r"\b(StyleSheet|Platform|Alert|Dimensions|Linking|Keyboard|Animated)\s*\.").unwrap(),
        local_declaration: Regex::new(r"\b(?:const|let|var|function|class)\s+([A-Z][\w$]*)").unwrap(),
        href_attr: Regex::new(r#"\s+href\s*=\s*("[^"]*"|'[^']*'|\{(?:[^{}]|\{[^{}]*\})*\})"#).unwrap(),
        link_props: Regex::new(r"\s+(?:passHref|legacyBehavior|prefetch)\b(?:=\{(?:true|false)\})?").unwrap(),
        src_attr: Regex::new(r#"\bsrc\s*=\s*("[^"]*"|'[^']*'|\{(?:[^{}]|\{[^{}]*\})*\})"#).unwrap(),
        alt_attr: Regex::new(r"\balt(\s*=)").unwrap(),
        image_only_props: Regex::new(
            r#"\s+(?:priority|fill|unoptimized)\b(?:=\{(?:true|false)\})?|\s+(?:placeholder|sizes|quality|loading|layout|objectFit|blurDataURL)\s*=\s*(?:"[^"]*"|'[^']*'|\{[^{}]*\})"#,
        )
        .unwrap(),
        size_attr: Regex::new(r#"\s+(width|height)\s*=\s*(?:\{(\d+)\}|"(\d+)")"#).unwrap(),
        on_change: Regex::new(r"\bonChange(\s*=)").unwrap(),
        target_value: Regex::new(r"\b([\w$]+)\.target\.value\b").unwrap(),
        input_type: Regex::new(r#"\s+type\s*=\s*["']([\w-]+)["']"#).unwrap(),
    }
});

/// Find the end of an opening tag that starts right after `<Name`
///
/// Braces and quotes are tracked so `=>` inside attributes does not end the tag.
fn tag_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Whether a `<` preceded by `prev` can open a JSX tag
///
/// `useRef<View>` and `Array<div>` are type arguments, not elements.
pub(crate) fn opens_jsx(prev: Option<char>) -> bool {
    !prev.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ']' | ')'))
}

/// Rewrite every opening `<name ...>` tag
///
/// `f` receives the tag text and the code following it, and returns the
/// replacement plus how many bytes of the following code it consumed.
pub(crate) fn rewrite_tags_with_tail(
    code: &str,
    name: &str,
    mut f: impl FnMut(&str, &str) -> (String, usize),
) -> String {
    let needle = format!("<{name}");
    let mut out = String::with_capacity(code.len());
    let mut rest = code;

    while let Some(pos) = rest.find(&needle) {
        let after = &rest[pos + needle.len()..];
        let at_boundary = after
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/');
        let prev = rest[..pos].chars().next_back().or_else(|| out.chars().next_back());
        if !at_boundary || !opens_jsx(prev) {
            out.push_str(&rest[..pos + needle.len()]);
            rest = after;
            continue;
        }
        let Some(end) = tag_end(after).map(|e| pos + needle.len() + e) else {
            break;
        };
        out.push_str(&rest[..pos]);
        let (replacement, consumed) = f(&rest[pos..end], &rest[end..]);
        out.push_str(&replacement);
        rest = &rest[(end + consumed).min(rest.len())..];
    }

    out.push_str(rest);
    out
}

pub(crate) fn rewrite_tags(code: &str, name: &str, mut f: impl FnMut(&str) -> String) -> String {
    rewrite_tags_with_tail(code, name, |tag, _| (f(tag), 0))
}

fn changed(before: &str, after: &str) -> bool {
    before != after
}

/// Drop `'use client'` / `'use server'`
pub fn remove_directives(code: &str) -> String {
    PATTERNS.directive.replace_all(code, "").into_owned()
}

/// Drop `next/head` imports and `<Head>` blocks
pub fn remove_head(code: &str) -> String {
    let (code, _) = imports::remove_module_imports(code, "next/head");
    PATTERNS.head_block.replace_all(&code, "").into_owned()
}

/// Rename every `<from` / `</from>` JSX tag to `to`
fn rename_component(code: &str, from: &str, to: &str) -> String {
    if from == to {
        return code.to_string();
    }
    let open = Regex::new(&format!(r"<{}\b", regex::escape(from)));
    let close = Regex::new(&format!(r"</{}\s*>", regex::escape(from)));
    match (open, close) {
        (Ok(open), Ok(close)) => {
            let code = open.replace_all(code, format!("<{to}").as_str()).into_owned();
            close.replace_all(&code, format!("</{to}>").as_str()).into_owned()
        }
        _ => code.to_string(),
    }
}

/// `next/link` becomes `TouchableOpacity`
pub fn replace_next_link(code: &str) -> String {
    let (mut code, names) = imports::remove_module_imports(code, "next/link");
    for name in names {
        code = rename_component(&code, &name, "TouchableOpacity");
    }
    code
}

/// `next/image` import dropped in favour of React Native `Image`
pub fn replace_next_image(code: &str) -> String {
    let (mut code, names) = imports::remove_module_imports(code, "next/image");
    let (after_legacy, legacy) = imports::remove_module_imports(&code, "next/legacy/image");
    code = after_legacy;
    for name in names.into_iter().chain(legacy) {
        code = rename_component(&code, &name, "Image");
    }
    code
}

/// `next/router` and `next/navigation` hooks become React Navigation hooks
pub fn replace_router(code: &str) -> String {
    let (code, router_names) = imports::remove_module_imports(code, "next/router");
    let (code, navigation_names) = imports::remove_module_imports(&code, "next/navigation");
    if router_names.is_empty() && navigation_names.is_empty() {
        return code;
    }

    let p = &*PATTERNS;
    let code = p.use_router.replace_all(&code, "useNavigation()");
    let code = p.router_binding.replace_all(&code, "${1} navigation = useNavigation()");
    let code = p.router_push.replace_all(&code, "navigation.navigate(");
    let code = p.router_back.replace_all(&code, "navigation.goBack()");
    let code = p.route_params.replace_all(&code, "useRoute().params");
    let code = p.route_name.replace_all(&code, "useRoute().name").into_owned();

    let mut hooks = Vec::new();
    if code.contains("useNavigation(") {
        hooks.push("useNavigation");
    }
    if code.contains("useRoute(") {
        hooks.push("useRoute");
    }
    imports::add_named_imports(&code, NAVIGATION_MODULE, &hooks)
}

/// HTML tags become React Native components
pub fn replace_html_tags(code: &str) -> String {
    let p = &*PATTERNS;
    let code = p.line_break.replace_all(code, "{'\\n'}");
    let code = p
        .rule
        .replace_all(&code, "<View style={{ height: 1, backgroundColor: '#e5e5e5' }} />");
    let source = code;
    let code = p.html_open.replace_all(&source, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if !opens_jsx(source[..start].chars().next_back()) {
            return caps[0].to_string();
        }
        let tag = &caps[1];
        let component = rn_component_for(tag).unwrap_or("View");
        if tag == "textarea" {
            format!("<{component} multiline")
        } else {
            format!("<{component}")
        }
    });
    p.html_close
        .replace_all(&code, |caps: &Captures| {
            format!("</{}>", rn_component_for(&caps[1]).unwrap_or("View"))
        })
        .into_owned()
}

/// `href` on touchables becomes an `onPress` handler
pub fn replace_hrefs(code: &str) -> String {
    let p = &*PATTERNS;
    rewrite_tags(code, "TouchableOpacity", |tag| {
        let tag = p.link_props.replace_all(tag, "").into_owned();
        let Some(caps) = p.href_attr.captures(&tag) else {
            return tag;
        };
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let value = &caps[1];
        let handler = if tag.contains("onPress") {
            String::new()
        } else {
            href_handler(value)
        };
        format!("{}{}{}", &tag[..whole.start], handler, &tag[whole.end..])
    })
}

fn href_handler(value: &str) -> String {
    let quoted = value.starts_with('"') || value.starts_with('\'');
    if quoted {
        let target = &value[1..value.len() - 1];
        if target.starts_with('#') || target.is_empty() {
            return String::new();
        }
        if target.starts_with('/') {
            let screen = screen_name_for_route(target);
            return format!(" onPress={{() => navigation.navigate('{screen}')}}");
        }
        return format!(" onPress={{() => Linking.openURL({value})}}");
    }
    let expr = value.trim_start_matches('{').trim_end_matches('}').trim();
    format!(" onPress={{() => navigation.navigate({expr})}}")
}

/// Route-path literals passed to `navigation.navigate` become screen names
pub fn replace_navigate_paths(code: &str) -> String {
    PATTERNS
        .navigate_path
        .replace_all(code, |caps: &Captures| {
            format!("navigation.navigate('{}'", screen_name_for_route(&caps[1]))
        })
        .into_owned()
}

/// Web image props become React Native `Image` props
pub fn fix_image_props(code: &str) -> String {
    let p = &*PATTERNS;
    rewrite_tags(code, "Image", |tag| {
        let mut tag = p
            .src_attr
            .replace_all(tag, |caps: &Captures| {
                let value = &caps[1];
                if value.starts_with('{') {
                    let expr = value[1..value.len() - 1].trim();
                    format!("source={{typeof {expr} === 'string' ? {{ uri: {expr} }} : {expr}}}")
                } else {
                    format!("source={{{{ uri: {value} }}}}")
                }
            })
            .into_owned();
        tag = p.alt_attr.replace_all(&tag, "accessibilityLabel${1}").into_owned();
        tag = p.image_only_props.replace_all(&tag, "").into_owned();

        if !tag.contains("style=") {
            let mut width = None;
            let mut height = None;
            for caps in p.size_attr.captures_iter(&tag) {
                let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str().to_string());
                match &caps[1] {
                    "width" => width = value,
                    _ => height = value,
                }
            }
            if let (Some(w), Some(h)) = (width, height) {
                tag = p.size_attr.replace_all(&tag, "").into_owned();
                let style = format!(" style={{{{ width: {w}, height: {h} }}}}");
                let insert_at = "<Image".len();
                tag.insert_str(insert_at, &style);
            }
        }
        tag
    })
}

/// Web input props become React Native `TextInput` props
pub fn fix_text_input_props(code: &str) -> String {
    let p = &*PATTERNS;
    rewrite_tags(code, "TextInput", |tag| {
        let tag = p.on_change.replace_all(tag, "onChangeText${1}");
        let tag = p.target_value.replace_all(&tag, "${1}");
        p.input_type
            .replace_all(&tag, |caps: &Captures| match &caps[1] {
                "password" => " secureTextEntry".to_string(),
                "email" => " keyboardType=\"email-address\"".to_string(),
                "number" | "tel" => " keyboardType=\"numeric\"".to_string(),
                _ => String::new(),
            })
            .into_owned()
    })
}

/// `onClick` becomes `onPress`
pub fn replace_on_click(code: &str) -> String {
    PATTERNS.on_click.replace_all(code, "onPress${1}").into_owned()
}

/// Drop `className` attributes
pub fn remove_class_names(code: &str) -> String {
    PATTERNS.class_name_attr.replace_all(code, "").into_owned()
}

/// `localStorage` calls become `AsyncStorage`
pub fn replace_local_storage(code: &str) -> String {
    if !PATTERNS.local_storage.is_match(code) {
        return code.to_string();
    }
    let code = PATTERNS
        .local_storage
        .replace_all(code, "AsyncStorage.${1}(")
        .into_owned();
    imports::add_default_import(&code, "AsyncStorage", ASYNC_STORAGE_MODULE)
}

/// Raw text directly inside containers is wrapped in `<Text>`
pub fn wrap_bare_text(code: &str) -> String {
    let mut code = code.to_string();
    for container in ["View", "TouchableOpacity", "Pressable"] {
        code = rewrite_tags_with_tail(&code, container, |tag, tail| {
            if tag.ends_with("/>") {
                return (tag.to_string(), 0);
            }
            let Some(stop) = tail.find(['<', '{']) else {
                return (tag.to_string(), 0);
            };
            let segment = &tail[..stop];
            let text = segment.trim();
            if text.is_empty() {
                return (tag.to_string(), 0);
            }
            let leading = &segment[..segment.len() - segment.trim_start().len()];
            let trailing = &segment[segment.trim_end().len()..];
            (format!("{tag}{leading}<Text>{text}</Text>{trailing}"), stop)
        });
    }
    code
}

/// Declare `navigation` in the first component when it is used but unbound
pub fn ensure_navigation(code: &str) -> String {
    let p = &*PATTERNS;
    if !p.navigation_used.is_match(code) || p.navigation_declared.is_match(code) {
        return code.to_string();
    }
    let Some(start) = p.component_start.find(code) else {
        return code.to_string();
    };
    let mut out = String::with_capacity(code.len() + 48);
    out.push_str(&code[..start.end()]);
    out.push_str("\n  const navigation = useNavigation();");
    out.push_str(&code[start.end()..]);
    imports::add_named_imports(&out, NAVIGATION_MODULE, &["useNavigation"])
}

/// Names of React Native components and APIs used but not bound
pub fn missing_rn_imports(code: &str) -> Vec<&'static str> {
    let p = &*PATTERNS;
    let bound = imports::imported_names(code);
    let declared: Vec<&str> = p
        .local_declaration
        .captures_iter(code)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let is_bound = |name: &str| bound.iter().any(|b| b == name) || declared.contains(&name);

    let mut missing = Vec::new();
    for caps in p.jsx_component.captures_iter(code) {
        if let Some(name) = RN_COMPONENTS.iter().find(|c| **c == &caps[1]) {
            if !is_bound(name) && !missing.contains(name) {
                missing.push(*name);
            }
        }
    }
    for caps in p.rn_api.captures_iter(code) {
        if let Some(name) = RN_APIS.iter().find(|c| **c == &caps[1]) {
            if !is_bound(name) && !missing.contains(name) {
                missing.push(*name);
            }
        }
    }
    missing
}

/// Add missing `react-native` imports
pub fn add_missing_imports(code: &str) -> String {
    let missing = missing_rn_imports(code);
    imports::add_named_imports(code, "react-native", &missing)
}

/// One rewrite step with the description recorded when it changes the code
pub(crate) struct Rule {
    pub description: &'static str,
    pub apply: fn(&str) -> String,
}

/// Rules in application order
pub(crate) fn rules(keep_class_names: bool) -> Vec<Rule> {
    let mut rules = vec![
        Rule { description: "removed 'use client'/'use server' directive", apply: remove_directives },
        Rule { description: "removed next/head", apply: remove_head },
        Rule { description: "replaced next/link with TouchableOpacity", apply: replace_next_link },
        Rule { description: "replaced next/image with Image", apply: replace_next_image },
        Rule { description: "replaced Next.js router with React Navigation", apply: replace_router },
        Rule { description: "replaced HTML tags with React Native components", apply: replace_html_tags },
        Rule { description: "converted href to onPress", apply: replace_hrefs },
        Rule { description: "converted route paths to screen names", apply: replace_navigate_paths },
        Rule { description: "converted image props", apply: fix_image_props },
        Rule { description: "converted text input props", apply: fix_text_input_props },
        Rule { description: "replaced onClick with onPress", apply: replace_on_click },
    ];
    if !keep_class_names {
        rules.push(Rule { description: "removed className attributes", apply: remove_class_names });
    }
    rules.extend([
        Rule { description: "replaced localStorage with AsyncStorage", apply: replace_local_storage },
        Rule { description: "wrapped raw text in Text", apply: wrap_bare_text },
        Rule { description: "declared navigation", apply: ensure_navigation },
        Rule { description: "added missing react-native imports", apply: add_missing_imports },
    ]);
    rules
}

/// Apply `rule`, reporting whether it changed anything
pub(crate) fn apply(rule: &Rule, code: &str) -> Option<String> {
    let out = (rule.apply)(code);
    changed(code, &out).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_tags() {
        let out = replace_html_tags("<div className=\"a\"><h1>Hi</h1><br/><img src=\"/a.png\" /><textarea value={v} /></div>");
        assert_eq!(
            out,
            "<View className=\"a\"><Text>Hi</Text>{'\\n'}<Image src=\"/a.png\" /><TextInput multiline value={v} /></View>"
        );
    }

    #[test]
    fn test_similar_names_untouched() {
        let code = "<article><abbr /><Text>a</Text></article>";
        assert_eq!(replace_html_tags(code), "<View><abbr /><Text>a</Text></View>");
    }

    #[test]
    fn test_type_arguments_untouched() {
        let code = "const ref = useRef<View>(null);\nconst items: Array<section> = [];\nreturn (<View>hello</View>);";
        assert_eq!(
            wrap_bare_text(code),
            "const ref = useRef<View>(null);\nconst items: Array<section> = [];\nreturn (<View><Text>hello</Text></View>);"
        );
        assert_eq!(
            replace_html_tags("const items: Array<section> = [];\n<section />"),
            "const items: Array<section> = [];\n<View />"
        );
    }

    #[test]
    fn test_tag_end_skips_arrows() {
        let code = "<TextInput onChange={(e) => setName(e.target.value)} type=\"email\" />";
        assert_eq!(
            fix_text_input_props(code),
            "<TextInput onChangeText={(e) => setName(e)} keyboardType=\"email-address\" />"
        );
    }

    #[test]
    fn test_next_link() {
        let code = "import Link from 'next/link';\nconst A = () => <Link href=\"/about\" passHref>About</Link>;\n";
        let code = replace_next_link(code);
        assert!(!code.contains("next/link"));
        let code = replace_hrefs(&code);
        assert_eq!(
            code,
            "const A = () => <TouchableOpacity onPress={() => navigation.navigate('About')}>About</TouchableOpacity>;\n"
        );
    }

    #[test]
    fn test_external_href() {
        let code = "<TouchableOpacity href=\"https://x.dev\">x</TouchableOpacity>";
        assert_eq!(
            replace_hrefs(code),
            "<TouchableOpacity onPress={() => Linking.openURL(\"https://x.dev\")}>x</TouchableOpacity>"
        );
    }

    #[test]
    fn test_next_image() {
        let code = "import Img from 'next/image';\nconst A = () => <Img src={logo} alt=\"Logo\" width={40} height={40} priority />;\n";
        let code = fix_image_props(&replace_next_image(code));
        assert_eq!(
            code,
            "const A = () => <Image style={{ width: 40, height: 40 }} source={typeof logo === 'string' ? { uri: logo } : logo} accessibilityLabel=\"Logo\" />;\n"
        );
    }

    #[test]
    fn test_string_image_source() {
        assert_eq!(
            fix_image_props("<Image src=\"/a.png\" />"),
            "<Image source={{ uri: \"/a.png\" }} />"
        );
    }

    #[test]
    fn test_router() {
        let code = "import { useRouter } from 'next/router';\nexport default function P() {\n  const router = useRouter();\n  const { id } = router.query;\n  return <View onPress={() => router.push('/posts')} />;\n}\n";
        let out = replace_navigate_paths(&replace_router(code));
        assert!(out.contains("import { useNavigation, useRoute } from '@react-navigation/native';"));
        assert!(out.contains("const navigation = useNavigation();"));
        assert!(out.contains("const { id } = useRoute().params;"));
        assert!(out.contains("navigation.navigate('Posts')"));
        assert!(!out.contains("next/router"));
    }

    #[test]
    fn test_local_storage() {
        let out = replace_local_storage("const t = localStorage.getItem('t');\n");
        assert!(out.starts_with("import AsyncStorage from '@react-native-async-storage/async-storage';\n"));
        assert!(out.contains("AsyncStorage.getItem('t')"));
    }

    #[test]
    fn test_class_names_removed() {
        let code = "<View className=\"p-4\" style={s}><Text className={`a ${b ? 'c' : ''}`}>x</Text></View>";
        assert_eq!(remove_class_names(code), "<View style={s}><Text>x</Text></View>");
    }

    #[test]
    fn test_wrap_bare_text() {
        assert_eq!(
            wrap_bare_text("<TouchableOpacity onPress={() => go()}> Go </TouchableOpacity>"),
            "<TouchableOpacity onPress={() => go()}> <Text>Go</Text> </TouchableOpacity>"
        );
        assert_eq!(wrap_bare_text("<View>\n  <Text>a</Text>\n</View>"), "<View>\n  <Text>a</Text>\n</View>");
    }

    #[test]
    fn test_ensure_navigation() {
        let code = "export default function Home() {\n  return <View onPress={() => navigation.goBack()} />;\n}\n";
        let out = ensure_navigation(code);
        assert!(out.contains("export default function Home() {\n  const navigation = useNavigation();"));
        assert!(out.contains("import { useNavigation } from '@react-navigation/native';"));

        let with_prop = "function Home({ navigation }) {\n  navigation.goBack();\n}\n";
        assert_eq!(ensure_navigation(with_prop), with_prop);
    }

    #[test]
    fn test_missing_imports() {
        let code = "import { View } from 'react-native';\nconst s = StyleSheet.create({});\nexport default () => <View><Text>a</Text><Card /></View>;\n";
        assert_eq!(missing_rn_imports(code), vec!["Text", "StyleSheet"]);
        let out = add_missing_imports(code);
        assert!(out.contains("import { View, Text, StyleSheet } from 'react-native';"));

        let image_from_expo = "import { Image } from 'expo-image';\nexport default () => <Image />;\n";
        assert!(missing_rn_imports(image_from_expo).is_empty());
    }

    #[test]
    fn test_directive_and_head() {
        let code = "'use client';\nimport Head from 'next/head';\nexport default () => (\n  <>\n    <Head>\n      <title>x</title>\n    </Head>\n    <View />\n  </>\n);\n";
        let out = remove_head(&remove_directives(code));
        assert_eq!(out, "export default () => (\n  <>\n    <View />\n  </>\n);\n");
    }
}
