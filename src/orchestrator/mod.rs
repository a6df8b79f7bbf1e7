//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次完整运行的调度，是命令行程序的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次运行：加载输入、上传、同步、分析、导出)
//!     ↓
//! workflow::ScreeningFlow (一次筛选会话)
//!     ↓
//! services (能力层：ingestion / sync / analysis / results / dashboard)
//!     ↓
//! clients (远程网关：ScreenerGateway)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源所有者**：只有编排层创建 HTTP 客户端
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和输出，不做具体业务判断

pub mod app;

pub use app::App;
