//! One function per subcommand, kept deliberately thin over
//! [`memory_core::Memory`].

use clap::{Args, ValueEnum};
use memory_core::context_builder::ConversationMessage;
use memory_core::promotion::TriggerKind;
use memory_core::types::{MemoryKind, SourceKind};
use memory_core::{Memory, RecallInput, RememberInput};

/// CLI-facing mirror of [`MemoryKind`], since clap needs `ValueEnum`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MemoryTypeArg {
    Fact,
    Assumption,
    Hypothesis,
    Discovery,
    Risk,
    Unknown,
    Decision,
    ArchitecturalDecision,
    Convention,
    CodingStandard,
    LessonLearned,
    Error,
    Bug,
}

impl From<MemoryTypeArg> for MemoryKind {
    fn from(value: MemoryTypeArg) -> Self {
        match value {
            MemoryTypeArg::Fact => MemoryKind::Fact,
            MemoryTypeArg::Assumption => MemoryKind::Assumption,
            MemoryTypeArg::Hypothesis => MemoryKind::Hypothesis,
            MemoryTypeArg::Discovery => MemoryKind::Discovery,
            MemoryTypeArg::Risk => MemoryKind::Risk,
            MemoryTypeArg::Unknown => MemoryKind::Unknown,
            MemoryTypeArg::Decision => MemoryKind::Decision,
            MemoryTypeArg::ArchitecturalDecision => MemoryKind::ArchitecturalDecision,
            MemoryTypeArg::Convention => MemoryKind::Convention,
            MemoryTypeArg::CodingStandard => MemoryKind::CodingStandard,
            MemoryTypeArg::LessonLearned => MemoryKind::LessonLearned,
            MemoryTypeArg::Error => MemoryKind::Error,
            MemoryTypeArg::Bug => MemoryKind::Bug,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TriggerArg {
    Periodic,
    SessionPause,
    SessionClose,
    MemoryLimit,
    AgentDecision,
}

impl From<TriggerArg> for TriggerKind {
    fn from(value: TriggerArg) -> Self {
        match value {
            TriggerArg::Periodic => TriggerKind::Periodic,
            TriggerArg::SessionPause => TriggerKind::SessionPause,
            TriggerArg::SessionClose => TriggerKind::SessionClose,
            TriggerArg::MemoryLimit => TriggerKind::MemoryLimit,
            TriggerArg::AgentDecision => TriggerKind::AgentDecision,
        }
    }
}

#[derive(Debug, Args)]
pub struct RememberArgs {
    pub session_id: String,
    pub content: String,
    #[arg(long, value_enum, default_value = "fact")]
    pub memory_type: MemoryTypeArg,
    #[arg(long, default_value_t = 0.8)]
    pub confidence: f64,
    #[arg(long)]
    pub rationale: Option<String>,
}

pub async fn remember(memory: &Memory, args: RememberArgs) -> anyhow::Result<()> {
    let id = memory
        .remember(
            &args.session_id,
            RememberInput {
                content: args.content,
                memory_type: args.memory_type.into(),
                confidence: args.confidence,
                source_type: SourceKind::User,
                agent_id: None,
                project_id: None,
                rationale: args.rationale,
                evidence_refs: vec![],
            },
        )
        .await?;
    println!("{id}");
    Ok(())
}

#[derive(Debug, Args)]
pub struct RecallArgs {
    pub session_id: String,
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long, default_value = "")]
    pub system_prompt: String,
}

pub async fn recall(memory: &Memory, args: RecallArgs) -> anyhow::Result<()> {
    let assembled = memory
        .recall(
            &args.session_id,
            RecallInput {
                system_prompt: args.system_prompt,
                conversation: Vec::<ConversationMessage>::new(),
                query_hint: args.query,
            },
        )
        .await?;
    println!("{}", memory.format_context(&assembled));
    Ok(())
}

#[derive(Debug, Args)]
pub struct ForgetArgs {
    pub session_id: String,
    pub id: String,
}

pub async fn forget(memory: &Memory, args: ForgetArgs) -> anyhow::Result<()> {
    memory.forget(&args.session_id, &args.id).await?;
    println!("forgot {}", args.id);
    Ok(())
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    pub session_id: String,
}

pub async fn stats(memory: &Memory, args: StatsArgs) -> anyhow::Result<()> {
    let stats = memory.get_stats(&args.session_id).await?;
    let count = memory.count(&args.session_id, false).await?;
    println!(
        "memories: {count}\ntriples: {}\nsubjects: {}\npredicates: {}\nobjects: {}",
        stats.triple_count, stats.distinct_subjects, stats.distinct_predicates, stats.distinct_objects
    );
    Ok(())
}

#[derive(Debug, Args)]
pub struct PromoteArgs {
    pub session_id: String,
    #[arg(long, value_enum, default_value = "periodic")]
    pub trigger: TriggerArg,
}

pub async fn promote(memory: &Memory, args: PromoteArgs) -> anyhow::Result<()> {
    let report = memory.promote(&args.session_id, args.trigger.into()).await?;
    println!("promoted: {}, failed: {}", report.promoted.len(), report.failed.len());
    for promoted in &report.promoted {
        println!("  {} -> {}", promoted.pending_id, promoted.memory_id);
    }
    Ok(())
}
