use anyhow::{anyhow, Context};
use foundry_client::{
    api::{Comment, CommentId, ThreadId, Uuid},
    viewer_from_env, ClientConfig, HttpCommentService, SyncEngine, HOST_ENV,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the comment service, defaults to FOUNDRY_HOST
    #[structopt(short, long)]
    host: Option<String>,

    /// Thread to operate on
    #[structopt(short, long)]
    thread: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the thread
    Show,

    /// Post a comment
    Post {
        /// Comment to reply to
        #[structopt(long)]
        parent: Option<Uuid>,

        content: String,
    },

    /// Replace the content of a comment
    Edit { id: Uuid, content: String },

    /// Delete a comment, leaving a tombstone
    Delete { id: Uuid },

    /// Upvote a comment, or remove the upvote if already there
    Upvote { id: Uuid },
}

fn print_comment(c: &Comment, depth: usize) {
    let marker = if c.has_upvoted { "*" } else { " " };
    println!(
        "{:indent$}{} [{}{marker}] {}",
        "",
        c.id,
        c.upvotes,
        c.content,
        indent = depth * 4
    );
    for r in c.replies.iter() {
        print_comment(r, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let host = match opt.host {
        Some(host) => host,
        None => std::env::var(HOST_ENV)
            .with_context(|| format!("no --host given and no {HOST_ENV} environment variable"))?,
    };
    let thread = ThreadId::new(opt.thread);
    thread.validate()?;
    let service = HttpCommentService::new(ClientConfig::new(host, viewer_from_env()?))?;

    let engine = SyncEngine::open(service, thread).await;
    if let Some(err) = engine.load_error() {
        return Err(anyhow!("failed loading thread {}: {err}", engine.thread_id()));
    }
    tracing::debug!(thread = %engine.thread_id(), roots = engine.comments().len(), "thread opened");

    match opt.cmd {
        Command::Show => (),
        Command::Post { parent, content } => {
            let c = engine
                .add_comment(content, parent.map(CommentId))
                .await
                .context("posting comment")?;
            println!("posted {}", c.id);
        }
        Command::Edit { id, content } => {
            engine
                .edit_comment(CommentId(id), content)
                .await
                .context("editing comment")?;
        }
        Command::Delete { id } => {
            engine
                .delete_comment(CommentId(id))
                .await
                .context("deleting comment")?;
        }
        Command::Upvote { id } => {
            let vote = engine
                .toggle_upvote(CommentId(id))
                .await
                .context("toggling upvote")?;
            println!(
                "{} upvote(s), {}",
                vote.upvotes,
                if vote.has_upvoted { "including yours" } else { "not including yours" }
            );
        }
    }

    for c in engine.comments().iter() {
        print_comment(c, 0);
    }
    Ok(())
}
