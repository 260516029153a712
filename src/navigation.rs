//! The navigation bar shown at the top of every protected page.

use maud::{Markup, html};

use crate::{endpoints, html::APP_NAME};

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent \
            lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
            lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 \
            dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 \
            dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let pages = [
            (endpoints::HOME_VIEW, "Home"),
            (endpoints::DASHBOARD_VIEW, "Dashboard"),
            (endpoints::ACCOUNTS, "Accounts"),
            (endpoints::CHARTS_VIEW, "Charts"),
            (endpoints::REPORTS_VIEW, "Reports"),
            (endpoints::PROFILE_VIEW, "Profile"),
        ];

        let mut links: Vec<Link> = pages
            .into_iter()
            .map(|(url, title)| Link {
                url,
                title,
                is_current: active_endpoint == url,
            })
            .collect();

        links.push(Link {
            url: endpoints::LOG_OUT,
            title: "Log out",
            is_current: false,
        });

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::HOME_VIEW)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        (APP_NAME)
                    }

                    ul
                        class="font-medium flex flex-col p-4 lg:p-0 mt-4 w-full lg:w-auto
                        border border-gray-100 rounded bg-gray-50
                        lg:flex-row lg:space-x-8 lg:mt-0
                        lg:border-0 lg:bg-white dark:bg-gray-800
                        lg:dark:bg-gray-900 dark:border-gray-700"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}
