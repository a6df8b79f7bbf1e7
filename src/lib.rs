//! # Resume Screener
//!
//! 简历筛选系统的客户端控制层
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 远程网关层（Clients）
//! - `clients/` - 所有远程调用的唯一入口
//! - `ScreenerGateway` - 网关接口，每个操作都有明确的请求/响应类型
//! - `ScreenerClient` - 基于 reqwest 的实现（JSON 与 multipart）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `IngestionManager` - 临时存储与持久存储的简历入库
//! - `SyncStatusPoller` - 邮箱同步触发与状态轮询
//! - `AnalysisTrigger` - 校验并提交分析
//! - `ResultsViewModel` - 结果筛选、备注、导出与邮件
//! - `DashboardService` - 仪表盘数据转换
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次筛选"的完整流程
//! - `SessionCtx` - 会话上下文（当前视图、分析进行中标记）
//! - `ScreeningFlow` - 流程编排（上传 → 同步 → 分析 → 结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 命令行运行器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ScreenerClient, ScreenerGateway};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisResult, Candidate, JobConfiguration, StorageScope, Verdict, VerdictFilter};
pub use orchestrator::App;
pub use services::{
    AnalysisTrigger, DashboardService, IngestionManager, ResultsViewModel, SyncStatusPoller,
};
pub use workflow::{ScreeningFlow, SessionCtx};
