use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "element-compat")]
#[command(about = "相性表の取り込み・相性照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// レコードストア（JSON）のパス（設定より優先）
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ワークブックの範囲から相性レコードを取り込む
    Import {
        /// 取り込み定義ファイル（JSON）
        #[arg(short, long, conflicts_with_all = ["range", "compatibility_type"])]
        manifest: Option<PathBuf>,

        /// 取り込み元ワークブック（.xlsx/.xls/.ods）
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// シート全体のグリッドJSON（ワークブックの代わり）
        #[arg(long, conflicts_with = "workbook")]
        grid_json: Option<PathBuf>,

        /// 範囲（例: '恋愛!A1:Z80'）
        #[arg(short, long, requires = "compatibility_type")]
        range: Option<String>,

        /// スキームID（正の整数）
        #[arg(short = 't', long = "type", requires = "range", allow_negative_numbers = true)]
        compatibility_type: Option<i64>,

        /// 範囲にシート名がない場合のシート名
        #[arg(long)]
        sheet: Option<String>,

        /// スキーム名（単一範囲の取り込み時）
        #[arg(long)]
        name: Option<String>,

        /// ドライラン（ストアに書き込まない）
        #[arg(long)]
        dry_run: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 2人分のコードで相性を照合
    Match {
        /// 照合クエリファイル（JSON）
        #[arg(short, long, conflicts_with_all = ["a_valuable", "a_problem", "b_valuable", "b_problem"])]
        query: Option<PathBuf>,

        /// Aさんの価値コード
        #[arg(long)]
        a_valuable: Option<String>,

        /// Aさんの課題コード
        #[arg(long)]
        a_problem: Option<String>,

        /// Bさんの価値コード
        #[arg(long)]
        b_valuable: Option<String>,

        /// Bさんの課題コード
        #[arg(long)]
        b_problem: Option<String>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// コードの照合パターンを表示
    Patterns {
        /// コード（例: F+、Ｆ－）
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// レコードの管理
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// スキームの管理
    Types {
        #[command(subcommand)]
        action: TypesAction,
    },

    /// レコードをExcelに書き出す
    Export {
        /// 出力ファイル/ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// スキームを限定
        #[arg(short = 't', long = "type")]
        compatibility_type: Option<u32>,
    },

    /// 設定を表示/編集
    Config {
        /// ストアのパスを設定
        #[arg(long)]
        set_store: Option<PathBuf>,

        /// 既定のワークブックを設定
        #[arg(long)]
        set_workbook: Option<PathBuf>,

        /// 既定のシート名を設定
        #[arg(long)]
        set_sheet: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum RecordsAction {
    /// レコード一覧
    List {
        /// スキームを限定
        #[arg(short = 't', long = "type")]
        compatibility_type: Option<u32>,
    },

    /// レコードを修正（値の指定がなければ対話入力）
    Edit {
        /// レコードID
        id: u64,

        /// 「-」で空にする
        #[arg(long, allow_hyphen_values = true)]
        a_peach: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        a_hard: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        b_peach: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        b_hard: Option<String>,
    },

    /// レコードを削除
    Delete {
        /// レコードID
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum TypesAction {
    /// スキーム一覧
    List,

    /// スキーム名・説明を登録
    Set {
        /// スキームID
        id: u32,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// スキームのメタデータを削除
    Remove {
        /// スキームID
        id: u32,
    },
}
