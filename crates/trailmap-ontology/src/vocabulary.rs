//! Built-in web-development vocabulary.

use crate::model::{CategoryInfo, Ontology, OntologyBuilder, TermDefinition};

/// Catch-all category of the built-in vocabulary.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Other";

/// Keyword rules in priority order: (category, pattern, unless followed by).
const FALLBACK_RULES: &[(&str, &str, Option<&str>)] = &[
    ("React/Next.js", r"react|next\.?js|リアクト", None),
    ("TypeScript", r"typescript|タイプスクリプト", None),
    ("JavaScript", r"javascript|ジャバスクリプト", None),
    ("JavaScript", r"js", Some("on")),
    ("Blockchain", r"symbol|blockchain|web3|ブロックチェーン", None),
    ("CSS/Design", r"css|tailwind|styling|design|デザイン", None),
    ("Backend", r"node|express|api|backend|server|バックエンド", None),
];

impl Ontology {
    /// The default vocabulary: 24 terms across 7 categories.
    pub fn builtin() -> Ontology {
        builtin_builder()
            .build()
            .expect("built-in vocabulary is valid")
    }
}

fn categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo::new("JavaScript", "The JavaScript language and its features", "yellow", "📜"),
        CategoryInfo::new("TypeScript", "The TypeScript language", "indigo", "📘"),
        CategoryInfo::new("React/Next.js", "React and the Next.js framework", "blue", "⚛️"),
        CategoryInfo::new("CSS/Design", "CSS and design techniques", "purple", "🎨"),
        CategoryInfo::new("Blockchain", "Blockchain technology", "green", "⛓️"),
        CategoryInfo::new("Backend", "Backend development", "orange", "🔧"),
        CategoryInfo::new(DEFAULT_FALLBACK_CATEGORY, "Other technologies", "gray", "📚"),
    ]
}

fn terms() -> Vec<TermDefinition> {
    vec![
        // JavaScript
        TermDefinition::new("JavaScript", "JavaScript")
            .aliases(&["javascript", "js", "ジャバスクリプト", "JavaScript基礎"])
            .level(1)
            .description("The JavaScript programming language"),
        TermDefinition::new("JavaScript ES6", "JavaScript")
            .aliases(&["es6", "es2015", "ECMAScript 6", "モダンJavaScript"])
            .prerequisites(&["JavaScript"])
            .level(2)
            .description("Modern JavaScript features from ES6 onward"),
        TermDefinition::new("Asynchronous JavaScript", "JavaScript")
            .aliases(&["JavaScript非同期", "async", "await", "promise", "promises", "非同期処理"])
            .prerequisites(&["JavaScript", "JavaScript ES6"])
            .level(3)
            .description("Asynchronous programming"),
        // TypeScript
        TermDefinition::new("TypeScript", "TypeScript")
            .aliases(&["typescript", "ts", "タイプスクリプト", "TypeScript基礎"])
            .prerequisites(&["JavaScript"])
            .level(2)
            .description("Typed superset of JavaScript"),
        TermDefinition::new("TypeScript Type System", "TypeScript")
            .aliases(&[
                "TypeScript型システム",
                "型推論",
                "generics",
                "ジェネリクス",
                "型定義",
                "type inference",
            ])
            .prerequisites(&["TypeScript"])
            .level(3)
            .description("The TypeScript type system"),
        TermDefinition::new("TypeScript Advanced Types", "TypeScript")
            .aliases(&[
                "TypeScript高度な型",
                "conditional types",
                "mapped types",
                "utility types",
                "高度な型",
            ])
            .prerequisites(&["TypeScript Type System"])
            .level(4)
            .description("Conditional, mapped and other advanced types"),
        // Web foundations and React
        TermDefinition::new("HTML/CSS", "CSS/Design")
            .aliases(&["html", "css", "styling", "マークアップ"])
            .level(1)
            .description("Web foundations"),
        TermDefinition::new("React", "React/Next.js")
            .aliases(&["react", "React.js", "ReactJS", "リアクト", "React基礎"])
            .prerequisites(&["JavaScript", "HTML/CSS"])
            .level(2)
            .description("The React UI library"),
        TermDefinition::new("React Hooks", "React/Next.js")
            .aliases(&["hooks", "useState", "useEffect", "useContext", "フック", "Reactフック"])
            .prerequisites(&["React"])
            .level(3)
            .description("The React Hooks API"),
        TermDefinition::new("React Context", "React/Next.js")
            .aliases(&["context api", "useContext", "コンテキスト"])
            .prerequisites(&["React", "React Hooks"])
            .level(3)
            .description("The React Context API"),
        TermDefinition::new("Advanced React Patterns", "React/Next.js")
            .aliases(&[
                "React高度なパターン",
                "render props",
                "higher-order components",
                "HOC",
                "compound components",
            ])
            .prerequisites(&["React", "React Hooks"])
            .level(4)
            .description("Advanced React design patterns"),
        // Next.js
        TermDefinition::new("Next.js", "React/Next.js")
            .aliases(&["nextjs", "next", "Next.js基礎"])
            .prerequisites(&["React", "React Hooks"])
            .level(3)
            .description("React framework"),
        TermDefinition::new("Next.js App Router", "React/Next.js")
            .aliases(&["app router", "app directory", "アプリルーター"])
            .prerequisites(&["Next.js", "React Hooks"])
            .level(3)
            .description("The Next.js 13+ App Router"),
        TermDefinition::new("Next.js Server Components", "React/Next.js")
            .aliases(&["server components", "RSC", "サーバーコンポーネント"])
            .prerequisites(&["Next.js App Router"])
            .level(4)
            .description("React Server Components"),
        TermDefinition::new("Tailwind CSS", "CSS/Design")
            .aliases(&["tailwind", "tailwindcss", "テイルウィンド"])
            .prerequisites(&["HTML/CSS"])
            .level(2)
            .description("Utility-first CSS framework"),
        // Blockchain
        TermDefinition::new("Web3 Fundamentals", "Blockchain")
            .aliases(&["Web3基礎", "web3", "blockchain basics", "ブロックチェーン基礎"])
            .level(1)
            .description("Web3 and blockchain fundamentals"),
        TermDefinition::new("Symbol Blockchain", "Blockchain")
            .aliases(&["symbol", "Symbol SDK", "symbolブロックチェーン", "NEM", "シンボル"])
            .prerequisites(&["JavaScript", "Web3 Fundamentals"])
            .level(4)
            .description("The Symbol blockchain platform"),
        TermDefinition::new("Smart Contracts", "Blockchain")
            .aliases(&["スマートコントラクト", "smart contract", "solidity", "contract", "スマコン"])
            .prerequisites(&["Web3 Fundamentals", "JavaScript"])
            .level(3)
            .description("Smart contract development"),
        // Backend
        TermDefinition::new("Node.js", "Backend")
            .aliases(&["node", "nodejs", "ノード"])
            .prerequisites(&["JavaScript"])
            .level(2)
            .description("JavaScript runtime"),
        TermDefinition::new("Express", "Backend")
            .aliases(&["express.js", "expressjs"])
            .prerequisites(&["Node.js"])
            .level(2)
            .description("Node.js web framework"),
        TermDefinition::new("REST API", "Backend")
            .aliases(&["rest", "restful", "api design", "API設計"])
            .prerequisites(&["JavaScript"])
            .level(2)
            .description("RESTful API design"),
        TermDefinition::new("Databases", "Backend")
            .aliases(&["データベース", "database", "db", "sql", "mongodb"])
            .level(2)
            .description("Database technology"),
        // General
        TermDefinition::new("Git", DEFAULT_FALLBACK_CATEGORY)
            .aliases(&["git", "github", "version control", "バージョン管理"])
            .level(1)
            .description("Version control"),
        TermDefinition::new("Algorithms", DEFAULT_FALLBACK_CATEGORY)
            .aliases(&[
                "アルゴリズム",
                "algorithm",
                "data structures",
                "データ構造",
                "アルゴリズムとデータ構造",
            ])
            .level(2)
            .description("Algorithms and data structures"),
    ]
}

/// Builder preloaded with the built-in vocabulary.
pub(crate) fn builtin_builder() -> OntologyBuilder {
    let mut builder = Ontology::builder().fallback_category(DEFAULT_FALLBACK_CATEGORY);
    for category in categories() {
        builder = builder.category(category);
    }
    for term in terms() {
        builder = builder.term(term);
    }
    default_rules(builder, |_| true)
}

/// Append the built-in keyword rules whose category passes `keep`.
pub(crate) fn default_rules(
    mut builder: OntologyBuilder,
    keep: impl Fn(&str) -> bool,
) -> OntologyBuilder {
    for (category, pattern, unless) in FALLBACK_RULES {
        if keep(*category) {
            builder = builder.fallback_rule(*category, *pattern, *unless);
        }
    }
    builder
}
