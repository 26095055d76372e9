use a11y_checklist::cli::{Cli, Command};
use a11y_checklist::config::Config;
use a11y_checklist::orchestrator::App;
use a11y_checklist::services::TestWriter;
use a11y_checklist::utils::init_logging;
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => {
            // 加载配置
            let mut config = Config::load(args.config.as_deref())?;
            args.apply(&mut config);

            // 初始化日志
            init_logging(config.verbose_logging);

            // 在打开浏览器之前检查目标、规则和凭证
            let target = args.target()?;
            let app = App::with_llm(config.clone(), args.rule, target, args.visual)?;

            let run = app.run().await?;

            println!("\n========================================");
            println!("          EVALUATION REPORT             ");
            println!("========================================\n");
            println!("{}", run.merged.to_markdown());

            if run.merged.has_tests() {
                let writer = TestWriter::new(&config.output_test_file);
                let path = writer.write(&run.merged.combined_test_script).await?;
                info!("✅ 已生成 Playwright 测试脚本: {}", path.display());
            } else {
                warn!("⚠️ 没有规则生成测试代码，未写入测试脚本");
            }
        }
    }

    Ok(())
}
